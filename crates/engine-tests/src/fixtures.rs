//! Legacy-shaped rows and run settings shared by the scenarios.

use crate::memory::MemorySource;
use engine_config::settings::tuning::TuningSettings;
use engine_core::cipher::encode;
use engine_processing::entities::{
    chart_of_accounts, cost_centers, geography, partners, payment_types, users,
};
use model::{core::value::Value, records::row::SourceRow};
use std::time::Duration;

/// Defaults, minus the pause and with the cheapest bcrypt cost.
pub fn tuning() -> TuningSettings {
    TuningSettings {
        hash_rounds: 4,
        chunk_pause: Duration::ZERO,
        ..TuningSettings::default()
    }
}

fn text(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

/// `password` is plaintext; it is stored under the default shift.
pub fn user(name: &str, email: Option<&str>, password: Option<&str>) -> SourceRow {
    let cipher = password.map(|p| encode("", p).unwrap_or_default());
    SourceRow::from_pairs([
        ("NOME", Value::from(name)),
        ("EMAIL", text(email)),
        ("SENHA", cipher.map(Value::from).unwrap_or(Value::Null)),
    ])
}

pub fn city(id: i64, name: &str, state: &str) -> SourceRow {
    SourceRow::from_pairs([
        ("ID", Value::Int(id)),
        ("NOMECIDADE", Value::from(name)),
        ("NOMEESTADO", Value::from(state)),
    ])
}

pub fn cities(n: i64) -> Vec<SourceRow> {
    (1..=n).map(|id| city(id, &format!("Cidade {id}"), "SC")).collect()
}

pub fn partner(cgc: &str, legal_name: &str, city_id: Option<i64>) -> SourceRow {
    SourceRow::from_pairs([
        ("CGC", Value::from(cgc)),
        ("RAZAOSOCIAL", Value::from(legal_name)),
        ("NOMEFANTASIA", Value::Null),
        ("NUMEROEND", Value::from("100")),
        ("EMAIL", Value::from(" contato@empresa.com.br ")),
        ("CEP", Value::from("89201-000")),
        ("RUA", Value::from("Rua XV")),
        ("BAIRRO", Value::from("Centro")),
        ("IDCIDADEESTADO", city_id.map(Value::Int).unwrap_or(Value::Null)),
        ("NUMEROCEL", Value::Null),
    ])
}

pub fn cost_center(id: i64, name: &str) -> SourceRow {
    SourceRow::from_pairs([("ID", Value::Int(id)), ("NOME", Value::from(name))])
}

pub fn account(code: &str, description: &str, kind: Option<&str>) -> SourceRow {
    SourceRow::from_pairs([
        ("CODICONTA", Value::from(code)),
        ("DESCCONTA", Value::from(description)),
        ("TIPOCONTA", text(kind)),
    ])
}

pub fn payment_type(code: &str, description: &str) -> SourceRow {
    SourceRow::from_pairs([("CODICOB", Value::from(code)), ("DESCCOB", Value::from(description))])
}

/// Suppliers `12345`, `222`, `333`; customers `12345` (again) and `444`.
pub fn partner_source(source: MemorySource) -> MemorySource {
    source
        .with(
            partners::SUPPLIERS_QUERY,
            vec![
                partner("12345", "Fornecedor Um", Some(1)),
                partner("222", "Fornecedor Dois", Some(2)),
                partner("333", "Fornecedor Tres", None),
            ],
        )
        .with(
            partners::CUSTOMERS_QUERY,
            vec![
                partner(" 12345 ", "Cliente Um", Some(3)),
                partner("444", "Cliente Dois", Some(1)),
            ],
        )
}

/// A small legacy database with every entity populated.
pub fn legacy_source() -> MemorySource {
    partner_source(MemorySource::new())
        .with(geography::QUERY, cities(3))
        .with(
            users::QUERY,
            vec![
                user("Ana Souza", Some("ana@empresa.com.br"), Some("senha123")),
                user("Bruno Lima", None, Some("outra")),
                user("Carla", Some("carla@empresa.com.br"), None),
            ],
        )
        .with(
            cost_centers::QUERY,
            vec![cost_center(10, "Administrativo"), cost_center(20, "Comercial")],
        )
        .with(
            chart_of_accounts::QUERY,
            vec![
                account("1", "Ativo", Some("1")),
                account("1.01", "Caixa", Some("2")),
                account("  ", "Sem codigo", None),
            ],
        )
        .with(
            payment_types::QUERY,
            vec![payment_type("1", "Dinheiro"), payment_type("2", " Boleto ")],
        )
}
