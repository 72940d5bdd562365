use crate::error::MigrationError;
use chrono::Utc;
use connectors::{source::SourceReader, target::TargetWriter};
use engine_config::settings::tuning::TuningSettings;
use engine_core::progress::Reporter;
use engine_processing::{
    context::MigrationContext,
    entities::{Migrator, all_migrators},
    error::EntityError,
};
use futures::{StreamExt, stream};
use model::{
    core::entity::Entity,
    events::progress::EventLevel,
    execution::{
        report::{EntityReport, MigrationResult},
        summary::MigrationSummary,
    },
};
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const CANCELLED: &str = "cancelled";
pub const CANCELLED_BEFORE_START: &str = "cancelled before start";

/// Runs entity migrators against one source and one target.
///
/// Entities run in dependency waves; inside a wave up to
/// `entity_concurrency` of them run at once. Every entity yields an
/// [`EntityReport`] whatever happens to the others.
pub struct Orchestrator {
    source: Arc<dyn SourceReader>,
    target: Arc<dyn TargetWriter>,
    tuning: TuningSettings,
    reporter: Reporter,
    cancel: CancellationToken,
    migrators: Vec<Arc<dyn Migrator>>,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn SourceReader>,
        target: Arc<dyn TargetWriter>,
        tuning: TuningSettings,
    ) -> Self {
        Self {
            source,
            target,
            tuning,
            reporter: Reporter::silent(),
            cancel: CancellationToken::new(),
            migrators: all_migrators(),
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

    /// Replaces the migrator set, e.g. to run a subset.
    pub fn with_migrators(mut self, migrators: Vec<Arc<dyn Migrator>>) -> Self {
        self.migrators = migrators;
        self
    }

    /// Pings both sides; the first one that fails aborts with
    /// [`MigrationError::Connectivity`].
    pub async fn check_connectivity(&self) -> Result<(), MigrationError> {
        if let Err(err) = self.source.ping().await {
            return Err(self.unreachable("source", err.to_string()));
        }
        if let Err(err) = self.target.ping().await {
            return Err(self.unreachable("target", err.to_string()));
        }
        info!(
            source = %self.source.describe(),
            target = %self.target.describe(),
            "Connectivity verified"
        );
        Ok(())
    }

    fn unreachable(&self, side: &'static str, message: String) -> MigrationError {
        error!(side, error = %message, "Connectivity check failed");
        self.reporter
            .error(format!("Cannot reach {side}: {message}"));
        MigrationError::Connectivity { side, message }
    }

    pub async fn run_all(&self) -> Result<MigrationSummary, MigrationError> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, entities = self.migrators.len(), "Starting full migration");
        self.reporter.info("Starting full migration");

        self.check_connectivity().await?;

        let concurrency = self.tuning.entity_concurrency.max(1);
        let mut reports = Vec::with_capacity(self.migrators.len());
        for wave in dependency_waves(&self.migrators) {
            let finished: Vec<EntityReport> = stream::iter(wave)
                .map(|migrator| self.execute(migrator))
                .buffered(concurrency)
                .collect()
                .await;
            reports.extend(finished);
        }

        let summary = MigrationSummary::from_reports(run_id, reports, started_at);
        let totals = summary.totals();
        if summary.success {
            info!(
                run_id = %summary.run_id,
                success = totals.success_count,
                errors = totals.error_count,
                duration_ms = summary.duration_ms(),
                "Migration completed"
            );
            self.reporter.status(
                EventLevel::Success,
                format!(
                    "Migration completed: {} migrated, {} errors",
                    totals.success_count, totals.error_count
                ),
                summary.status(),
            );
        } else {
            let failed = summary.failed_names().join(", ");
            warn!(run_id = %summary.run_id, failed = %failed, "Migration finished with failures");
            self.reporter.status(
                EventLevel::Error,
                format!("Migration finished with failures: {failed}"),
                summary.status(),
            );
        }
        Ok(summary)
    }

    /// Re-runs a single entity by canonical or legacy name.
    pub async fn run_one(&self, name: &str) -> Result<EntityReport, MigrationError> {
        let entity: Entity = name.parse()?;
        self.check_connectivity().await?;

        let migrator = self
            .migrators
            .iter()
            .find(|m| m.entity() == entity)
            .cloned()
            .unwrap_or_else(|| engine_processing::entities::migrator_for(entity));

        let report = self.execute(migrator).await;
        let status: BTreeMap<String, MigrationResult> = report
            .result
            .map(|r| BTreeMap::from([(entity.to_string(), r)]))
            .unwrap_or_default();
        let level = if report.success { EventLevel::Success } else { EventLevel::Error };
        self.reporter
            .for_entity(entity)
            .status(level, format!("{entity} migration finished"), status);
        Ok(report)
    }

    fn context(&self) -> MigrationContext {
        MigrationContext::new(
            Arc::clone(&self.source),
            Arc::clone(&self.target),
            self.tuning.clone(),
            self.reporter.clone(),
            self.cancel.clone(),
        )
    }

    /// Runs one migrator on its own task so a panic is contained to its
    /// report.
    async fn execute(&self, migrator: Arc<dyn Migrator>) -> EntityReport {
        let entity = migrator.entity();
        let reporter = self.reporter.for_entity(entity);

        if self.cancel.is_cancelled() {
            warn!(entity = %entity, "Stop requested, entity not started");
            reporter.warning("Cancelled before start");
            return EntityReport::failed(entity, CANCELLED_BEFORE_START);
        }

        let ctx = self.context();
        let started = Instant::now();
        let outcome = tokio::spawn(async move { migrator.migrate(&ctx).await }).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    entity = %entity,
                    success = result.success_count,
                    errors = result.error_count,
                    elapsed_ms,
                    "Entity migrated"
                );
                EntityReport::completed(entity, result)
            }
            Ok(Err(EntityError::Cancelled { partial })) => {
                warn!(entity = %entity, written = partial.success_count, "Entity cancelled");
                reporter.warning(format!(
                    "Cancelled after {} rows written",
                    partial.success_count
                ));
                EntityReport::partial(entity, partial, CANCELLED)
            }
            Ok(Err(err)) => {
                error!(entity = %entity, error = %err, elapsed_ms, "Entity migration failed");
                reporter.error(format!("Migration failed: {err}"));
                EntityReport::failed(entity, err.to_string())
            }
            Err(join) => {
                error!(entity = %entity, error = %join, "Entity task aborted");
                reporter.error(format!("Migration aborted: {join}"));
                EntityReport::failed(entity, format!("task aborted: {join}"))
            }
        }
    }
}

/// Groups migrators so each one runs after everything it depends on.
/// Dependencies outside the given set are ignored; input order is kept
/// within a wave.
pub fn dependency_waves(migrators: &[Arc<dyn Migrator>]) -> Vec<Vec<Arc<dyn Migrator>>> {
    let present: HashSet<Entity> = migrators.iter().map(|m| m.entity()).collect();
    let mut done: HashSet<Entity> = HashSet::new();
    let mut pending = migrators.to_vec();
    let mut waves = Vec::new();

    while !pending.is_empty() {
        let (ready, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|m| {
            m.entity()
                .depends_on()
                .iter()
                .all(|dep| done.contains(dep) || !present.contains(dep))
        });
        if ready.is_empty() {
            // unsatisfiable: run the remainder together rather than never
            waves.push(rest);
            break;
        }
        done.extend(ready.iter().map(|m| m.entity()));
        waves.push(ready);
        pending = rest;
    }

    waves
}
