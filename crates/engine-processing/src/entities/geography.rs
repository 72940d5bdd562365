use super::{EntityMigration, TargetRow};
use crate::{
    context::MigrationContext,
    error::TransformError,
    transform::fields::{optional_text, required_int},
};
use async_trait::async_trait;
use model::{
    core::{entity::Entity, value::Value},
    records::row::{SourceRow, TargetRecord},
};
use planner::table::TargetTable;

pub const QUERY: &str =
    "SELECT ID_MUNICIPIO AS ID, MUNICIPIO AS NOMECIDADE, UF AS NOMEESTADO FROM MUNICIPIO";

#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub id: i64,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl TargetRow for CityRecord {
    fn into_record(self) -> TargetRecord {
        vec![Value::Int(self.id), self.city.into(), self.state.into()]
    }
}

/// Municipalities, keyed by their legacy id. Partners point at these.
pub struct GeographyMigration;

#[async_trait]
impl EntityMigration for GeographyMigration {
    type Record = CityRecord;

    const ENTITY: Entity = Entity::Geography;

    fn table(&self) -> TargetTable {
        TargetTable::new("cidadeestado", &["id", "nomecidade", "nomeestado"]).upsert_on("id")
    }

    fn queries(&self) -> &'static [&'static str] {
        &[QUERY]
    }

    async fn transform(&self, row: SourceRow, _ctx: &MigrationContext) -> Result<CityRecord, TransformError> {
        Ok(CityRecord {
            id: required_int(&row, "ID")?,
            city: optional_text(&row, "NOMECIDADE"),
            state: optional_text(&row, "NOMEESTADO"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::tests::context, test_support::{ScriptedTarget, StaticSource}};
    use planner::query::ast::insert::ConflictAction;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_decodes_city_and_upserts_by_id() {
        let (ctx, _) = context(StaticSource::default(), Arc::new(ScriptedTarget::default()));
        let row = SourceRow::from_pairs([
            ("ID", Value::Int(4205)),
            ("NOMECIDADE", Value::from(" Joinville ")),
            ("NOMEESTADO", Value::from("SC")),
        ]);

        let record = GeographyMigration.transform(row, &ctx).await.unwrap();
        assert_eq!(
            record.into_record(),
            vec![Value::Int(4205), Value::from("Joinville"), Value::from("SC")]
        );

        let stmt = GeographyMigration.table().batch_insert(&[]);
        let conflict = stmt.on_conflict.unwrap();
        assert!(matches!(conflict.action, ConflictAction::DoUpdate { ref assignments } if assignments.len() == 2));
    }

    #[tokio::test]
    async fn test_missing_id_skips_row() {
        let (ctx, _) = context(StaticSource::default(), Arc::new(ScriptedTarget::default()));
        let row = SourceRow::from_pairs([("ID", Value::Null), ("NOMECIDADE", Value::from("X"))]);
        assert!(GeographyMigration.transform(row, &ctx).await.is_err());
    }
}
