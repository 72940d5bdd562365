use super::{EntityMigration, TargetRow};
use crate::{
    context::MigrationContext,
    error::TransformError,
    transform::fields::{required_int, required_text},
};
use async_trait::async_trait;
use model::{
    core::{entity::Entity, value::Value},
    records::row::{SourceRow, TargetRecord},
};
use planner::table::TargetTable;

pub const QUERY: &str = "SELECT t.codicob, t.desccob FROM TIPOCOB t \
     WHERE t.codicob IS NOT NULL AND t.desccob IS NOT NULL";

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTypeRecord {
    pub id: i64,
    pub name: String,
}

impl TargetRow for PaymentTypeRecord {
    fn into_record(self) -> TargetRecord {
        vec![Value::Int(self.id), Value::String(self.name)]
    }
}

pub struct PaymentTypesMigration;

#[async_trait]
impl EntityMigration for PaymentTypesMigration {
    type Record = PaymentTypeRecord;

    const ENTITY: Entity = Entity::PaymentTypes;

    fn table(&self) -> TargetTable {
        TargetTable::new("tipopag", &["id", "nome"]).upsert_on("id")
    }

    fn queries(&self) -> &'static [&'static str] {
        &[QUERY]
    }

    async fn transform(
        &self,
        row: SourceRow,
        _ctx: &MigrationContext,
    ) -> Result<PaymentTypeRecord, TransformError> {
        Ok(PaymentTypeRecord {
            id: required_int(&row, "CODICOB")?,
            name: required_text(&row, "DESCCOB")?,
        })
    }
}
