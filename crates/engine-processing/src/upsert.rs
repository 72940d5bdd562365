use crate::error::EntityError;
use connectors::{error::WriteErrorKind, target::TargetWriter};
use engine_core::progress::Reporter;
use model::{
    execution::report::MigrationResult,
    records::{batch::Batch, row::TargetRecord},
};
use planner::table::TargetTable;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Writes record sets to one target table in bounded chunks.
///
/// Each chunk is one multi-row statement. A chunk rejected for a key
/// conflict is retried one row at a time; any other failure marks the whole
/// chunk as errors. Nothing is re-thrown: callers always get counts back.
pub struct BatchUpserter {
    target: Arc<dyn TargetWriter>,
    batch_size: usize,
    pause: Duration,
    reporter: Reporter,
    cancel: CancellationToken,
}

impl BatchUpserter {
    pub fn new(target: Arc<dyn TargetWriter>, batch_size: usize, pause: Duration) -> Self {
        Self {
            target,
            batch_size: batch_size.max(1),
            pause,
            reporter: Reporter::silent(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Writes one chunk of `rows` into `table`.
    pub async fn upsert(&self, table: &TargetTable, rows: &[TargetRecord]) -> MigrationResult {
        if rows.is_empty() {
            return MigrationResult::default();
        }

        let stmt = table.batch_insert(rows);
        match self.target.insert(&stmt).await {
            Ok(affected) => MigrationResult::succeeded(affected),
            Err(err) if err.is_conflict() => {
                warn!(
                    table = %table.name,
                    rows = rows.len(),
                    error = %err,
                    "Batch hit a key conflict, inserting rows individually"
                );
                self.insert_individually(table, rows).await
            }
            Err(err) => {
                error!(table = %table.name, rows = rows.len(), error = %err, "Batch insert failed");
                self.reporter
                    .error(format!("Batch of {} rows into {} failed: {err}", rows.len(), table.name));
                MigrationResult::failed(rows.len() as u64)
            }
        }
    }

    async fn insert_individually(&self, table: &TargetTable, rows: &[TargetRecord]) -> MigrationResult {
        let mut result = MigrationResult::default();
        for row in rows {
            match self.target.insert(&table.single_insert(row)).await {
                Ok(affected) => result.success_count += affected,
                Err(err) if err.kind == WriteErrorKind::UniqueViolation => {
                    debug!(table = %table.name, "Row already present, skipped");
                    result.error_count += 1;
                }
                Err(err) => {
                    warn!(table = %table.name, error = %err, "Row insert failed");
                    result.error_count += 1;
                }
            }
        }
        result
    }

    /// Configured batch size, capped so one chunk fits in a single statement.
    fn chunk_size(&self, table: &TargetTable) -> usize {
        let limit = table.max_rows_per_statement();
        if self.batch_size > limit {
            debug!(
                table = %table.name,
                batch_size = self.batch_size,
                limit,
                "Batch size exceeds the statement parameter limit, capping"
            );
        }
        self.batch_size.min(limit)
    }

    /// Chunks `rows` and writes the chunks in order, pausing between them.
    ///
    /// Stops scheduling chunks once cancellation is observed and reports what
    /// was already written through [`EntityError::Cancelled`].
    pub async fn write_all(
        &self,
        table: &TargetTable,
        rows: Vec<TargetRecord>,
    ) -> Result<MigrationResult, EntityError> {
        let chunk_size = self.chunk_size(table);
        let batches = Batch::split(rows, chunk_size);
        let mut total = MigrationResult::default();

        for (i, batch) in batches.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.pause) => {}
                }
            }
            if self.cancel.is_cancelled() {
                warn!(table = %table.name, chunk = %batch.label(), "Stop requested, no further chunks");
                return Err(EntityError::Cancelled { partial: total });
            }

            self.reporter
                .info(format!("Writing chunk {} ({} rows)", batch.label(), batch.len()));
            let result = self.upsert(table, &batch.rows).await;
            info!(
                table = %table.name,
                chunk = %batch.label(),
                success = result.success_count,
                errors = result.error_count,
                "Chunk written"
            );
            total += result;
        }

        Ok(total)
    }
}
