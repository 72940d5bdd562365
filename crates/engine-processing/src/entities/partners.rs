use super::{EntityMigration, TargetRow};
use crate::{
    context::MigrationContext,
    error::TransformError,
    transform::fields::{optional_int, optional_text, required_text},
};
use async_trait::async_trait;
use model::{
    core::{entity::Entity, value::Value},
    records::row::{SourceRow, TargetRecord},
};
use planner::table::TargetTable;

pub const SUPPLIERS_QUERY: &str = "SELECT F.CGCFORNEC AS CGC, F.RAZAOFORNEC AS RAZAOSOCIAL, \
     F.NOMEFANTFORNEC AS NOMEFANTASIA, F.NUMEROEND AS NUMEROEND, F.EMAILFORNEC AS EMAIL, \
     F.CEPFORNEC AS CEP, F.ENDFORNEC AS RUA, F.BAIRROFORNEC AS BAIRRO, \
     F.ID_MUNICIPIO AS IDCIDADEESTADO, F.FONE1FORNEC AS NUMEROCEL \
     FROM FORNECEDOR F WHERE F.CGCFORNEC IS NOT NULL AND F.CGCFORNEC != ''";

pub const CUSTOMERS_QUERY: &str = "SELECT C.CGCCLI AS CGC, C.RAZSOCCLI AS RAZAOSOCIAL, \
     C.NOMFANTCLI AS NOMEFANTASIA, C.NUMEROEND AS NUMEROEND, C.EMAILCLI AS EMAIL, \
     C.CEPCLI AS CEP, C.ENDCLI AS RUA, C.BAIRROCLI AS BAIRRO, \
     C.ID_MUNICIPIO AS IDCIDADEESTADO, C.FONE1CLI AS NUMEROCEL \
     FROM CLIENTE C WHERE C.CGCCLI IS NOT NULL AND C.CGCCLI != ''";

const COLUMNS: [&str; 10] = [
    "cgc",
    "razaosocial",
    "nomefantasia",
    "numeroend",
    "email",
    "cep",
    "rua",
    "bairro",
    "idcidadeestado",
    "numerocel",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PartnerRecord {
    /// Tax id (CNPJ/CPF), the natural key.
    pub cgc: String,
    pub legal_name: Option<String>,
    pub trade_name: Option<String>,
    pub street_number: Option<String>,
    pub email: Option<String>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub district: Option<String>,
    pub city_id: Option<i64>,
    pub phone: Option<String>,
}

impl TargetRow for PartnerRecord {
    fn into_record(self) -> TargetRecord {
        vec![
            Value::String(self.cgc),
            self.legal_name.into(),
            self.trade_name.into(),
            self.street_number.into(),
            self.email.into(),
            self.postal_code.into(),
            self.street.into(),
            self.district.into(),
            self.city_id.into(),
            self.phone.into(),
        ]
    }

    fn dedup_key(&self) -> Option<String> {
        Some(self.cgc.clone())
    }
}

/// Suppliers and customers merged into one partner table. Suppliers are
/// read first, so a tax id present in both keeps the supplier's data.
pub struct PartnersMigration;

#[async_trait]
impl EntityMigration for PartnersMigration {
    type Record = PartnerRecord;

    const ENTITY: Entity = Entity::Partners;

    fn table(&self) -> TargetTable {
        TargetTable::new("clifornec", &COLUMNS).upsert_on("cgc")
    }

    fn queries(&self) -> &'static [&'static str] {
        &[SUPPLIERS_QUERY, CUSTOMERS_QUERY]
    }

    async fn transform(&self, row: SourceRow, _ctx: &MigrationContext) -> Result<PartnerRecord, TransformError> {
        Ok(PartnerRecord {
            cgc: required_text(&row, "CGC")?,
            legal_name: optional_text(&row, "RAZAOSOCIAL"),
            trade_name: optional_text(&row, "NOMEFANTASIA"),
            street_number: optional_text(&row, "NUMEROEND"),
            email: optional_text(&row, "EMAIL"),
            postal_code: optional_text(&row, "CEP"),
            street: optional_text(&row, "RUA"),
            district: optional_text(&row, "BAIRRO"),
            city_id: optional_int(&row, "IDCIDADEESTADO").filter(|id| *id != 0),
            phone: optional_text(&row, "NUMEROCEL"),
        })
    }
}
