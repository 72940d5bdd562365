use super::{EntityMigration, TargetRow};
use crate::{
    context::MigrationContext,
    error::TransformError,
    transform::fields::{optional_text, required_text},
};
use async_trait::async_trait;
use engine_core::cipher::recover_password;
use model::{
    core::{entity::Entity, value::Value},
    records::row::{SourceRow, TargetRecord},
};
use planner::table::TargetTable;

pub const QUERY: &str = "SELECT NOME, EMAIL, SENHA FROM USUARIO WHERE ATIVO = 'S'";

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    /// bcrypt hash of the recovered legacy password.
    pub password_hash: String,
}

impl TargetRow for UserRecord {
    fn into_record(self) -> TargetRecord {
        vec![
            Value::String(self.name),
            Value::String(self.email),
            Value::String(self.password_hash),
        ]
    }
}

/// Address derived from a user's name when the legacy row has none.
pub fn synthesize_email(name: &str, domain: &str) -> String {
    let local: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("{local}@{domain}")
}

/// Active legacy users. Passwords are recovered from the shift cipher and
/// re-hashed; the plaintext never leaves this transform.
///
/// There is no conflict clause on `usuario`, so running this twice
/// inserts every user twice.
pub struct UsersMigration;

#[async_trait]
impl EntityMigration for UsersMigration {
    type Record = UserRecord;

    const ENTITY: Entity = Entity::Users;

    fn table(&self) -> TargetTable {
        TargetTable::new("usuario", &["name", "email", "senha"])
    }

    fn queries(&self) -> &'static [&'static str] {
        &[QUERY]
    }

    async fn transform(&self, row: SourceRow, ctx: &MigrationContext) -> Result<UserRecord, TransformError> {
        let name = required_text(&row, "NOME")?;
        let cipher_text = optional_text(&row, "SENHA").ok_or(TransformError::MissingPassword)?;

        let plain = recover_password(&ctx.tuning.cipher_key, &cipher_text);
        let password_hash = ctx.hasher.hash(plain).await?;

        let email = optional_text(&row, "EMAIL")
            .unwrap_or_else(|| synthesize_email(&name, &ctx.tuning.fallback_email_domain));

        Ok(UserRecord {
            name,
            email,
            password_hash,
        })
    }
}
