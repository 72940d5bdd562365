use super::{EntityMigration, TargetRow};
use crate::{
    context::MigrationContext,
    error::TransformError,
    transform::fields::{optional_text, required_key},
};
use async_trait::async_trait;
use model::{
    core::{entity::Entity, value::Value},
    records::row::{SourceRow, TargetRecord},
};
use planner::table::TargetTable;

pub const QUERY: &str = "SELECT c.codcentrocust AS ID, c.desccentrcust AS NOME FROM CENTROCUSTO c";

#[derive(Debug, Clone, PartialEq)]
pub struct CostCenterRecord {
    /// Legacy code, kept in whatever type the source column has.
    pub id: Value,
    pub name: Option<String>,
}

impl TargetRow for CostCenterRecord {
    fn into_record(self) -> TargetRecord {
        vec![self.id, self.name.into()]
    }
}

pub struct CostCentersMigration;

#[async_trait]
impl EntityMigration for CostCentersMigration {
    type Record = CostCenterRecord;

    const ENTITY: Entity = Entity::CostCenters;

    fn table(&self) -> TargetTable {
        TargetTable::new("centrocusto", &["id", "nome"]).upsert_on("id")
    }

    fn queries(&self) -> &'static [&'static str] {
        &[QUERY]
    }

    async fn transform(
        &self,
        row: SourceRow,
        _ctx: &MigrationContext,
    ) -> Result<CostCenterRecord, TransformError> {
        Ok(CostCenterRecord {
            id: required_key(&row, "ID")?,
            name: optional_text(&row, "NOME"),
        })
    }
}
