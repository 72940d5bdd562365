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

pub const QUERY: &str = "SELECT p.codiconta, p.descconta, p.tipoconta FROM PLC p ORDER BY p.codiconta";

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub code: String,
    pub description: Option<String>,
    pub kind: Option<i64>,
}

impl TargetRow for AccountRecord {
    fn into_record(self) -> TargetRecord {
        vec![
            Value::String(self.code),
            self.description.into(),
            self.kind.into(),
        ]
    }
}

/// Chart of accounts. Rows without an account code are dropped.
pub struct ChartOfAccountsMigration;

#[async_trait]
impl EntityMigration for ChartOfAccountsMigration {
    type Record = AccountRecord;

    const ENTITY: Entity = Entity::ChartOfAccounts;

    fn table(&self) -> TargetTable {
        TargetTable::new("plc", &["codiconta", "descconta", "tipoconta"]).upsert_on("codiconta")
    }

    fn queries(&self) -> &'static [&'static str] {
        &[QUERY]
    }

    async fn transform(&self, row: SourceRow, _ctx: &MigrationContext) -> Result<AccountRecord, TransformError> {
        Ok(AccountRecord {
            code: required_text(&row, "CODICONTA")?,
            description: optional_text(&row, "DESCCONTA"),
            kind: optional_int(&row, "TIPOCONTA"),
        })
    }
}
