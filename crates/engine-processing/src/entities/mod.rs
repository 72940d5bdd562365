//! The six entity pipelines: read, decode, dedup, write in chunks.

use crate::{
    context::MigrationContext,
    error::{EntityError, TransformError},
    transform::dedup::dedup_first_seen,
};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use model::{
    core::entity::Entity,
    execution::report::MigrationResult,
    records::row::{SourceRow, TargetRecord},
};
use planner::table::TargetTable;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod chart_of_accounts;
pub mod cost_centers;
pub mod geography;
pub mod partners;
pub mod payment_types;
pub mod users;

pub use chart_of_accounts::ChartOfAccountsMigration;
pub use cost_centers::CostCentersMigration;
pub use geography::GeographyMigration;
pub use partners::PartnersMigration;
pub use payment_types::PaymentTypesMigration;
pub use users::UsersMigration;

/// A decoded row, ready to be laid out in its table's column order.
pub trait TargetRow {
    fn into_record(self) -> TargetRecord;

    /// Natural key used to drop later duplicates before writing.
    fn dedup_key(&self) -> Option<String> {
        None
    }
}

/// Per-entity parameters of the shared pipeline.
#[async_trait]
pub trait EntityMigration: Send + Sync {
    type Record: TargetRow + Send;

    const ENTITY: Entity;

    fn table(&self) -> TargetTable;

    /// Source queries, read in order. Earlier queries win dedup ties.
    fn queries(&self) -> &'static [&'static str];

    async fn transform(
        &self,
        row: SourceRow,
        ctx: &MigrationContext,
    ) -> Result<Self::Record, TransformError>;
}

/// Runs one entity end to end.
///
/// Source failures abort the entity. Rows that fail to decode are skipped
/// with a warning and counted nowhere; only writes produce counts.
pub async fn run_entity<M>(migration: &M, ctx: &MigrationContext) -> Result<MigrationResult, EntityError>
where
    M: EntityMigration,
{
    let entity = M::ENTITY;
    ctx.reporter.info(format!("Starting {entity} migration"));

    let mut rows = Vec::new();
    for sql in migration.queries() {
        let fetched = ctx.source.query(sql).await?;
        debug!(entity = %entity, rows = fetched.len(), "Source query returned");
        rows.extend(fetched);
    }

    if rows.is_empty() {
        info!(entity = %entity, "No rows found in source");
        ctx.reporter.info("No rows found in source");
        return Ok(MigrationResult::default());
    }

    let read = rows.len();
    ctx.reporter.info(format!("Found {read} rows to migrate"));

    let decoded: Vec<(usize, Result<M::Record, TransformError>)> = stream::iter(rows.into_iter().enumerate())
        .map(|(i, row)| async move { (i, migration.transform(row, ctx).await) })
        .buffered(ctx.tuning.concurrent_operations.max(1))
        .collect()
        .await;

    let mut records = Vec::with_capacity(decoded.len());
    let mut skipped = 0usize;
    for (i, outcome) in decoded {
        match outcome {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                warn!(entity = %entity, row = i, error = %err, "Skipping row");
                ctx.reporter.warning(format!("Skipping row {i}: {err}"));
            }
        }
    }

    let (records, dropped) = dedup_first_seen(records, |r| r.dedup_key());
    if dropped > 0 {
        ctx.reporter
            .info(format!("{} unique rows after dropping {dropped} duplicates", records.len()));
    }
    info!(entity = %entity, read, skipped, dropped, remaining = records.len(), "Rows prepared");

    let table = migration.table();
    let records: Vec<TargetRecord> = records.into_iter().map(TargetRow::into_record).collect();
    let result = ctx.upserter().write_all(&table, records).await?;

    ctx.reporter.success(format!(
        "{} migrated, {} errors",
        result.success_count, result.error_count
    ));
    Ok(result)
}

/// Object-safe handle over any [`EntityMigration`].
#[async_trait]
pub trait Migrator: Send + Sync {
    fn entity(&self) -> Entity;

    async fn migrate(&self, ctx: &MigrationContext) -> Result<MigrationResult, EntityError>;
}

#[async_trait]
impl<M> Migrator for M
where
    M: EntityMigration,
{
    fn entity(&self) -> Entity {
        M::ENTITY
    }

    async fn migrate(&self, ctx: &MigrationContext) -> Result<MigrationResult, EntityError> {
        run_entity(self, &ctx.for_entity(M::ENTITY)).await
    }
}

pub fn migrator_for(entity: Entity) -> Arc<dyn Migrator> {
    match entity {
        Entity::Geography => Arc::new(GeographyMigration),
        Entity::Users => Arc::new(UsersMigration),
        Entity::Partners => Arc::new(PartnersMigration),
        Entity::CostCenters => Arc::new(CostCentersMigration),
        Entity::ChartOfAccounts => Arc::new(ChartOfAccountsMigration),
        Entity::PaymentTypes => Arc::new(PaymentTypesMigration),
    }
}

pub fn all_migrators() -> Vec<Arc<dyn Migrator>> {
    Entity::ALL.into_iter().map(migrator_for).collect()
}
