use crate::upsert::BatchUpserter;
use connectors::{source::SourceReader, target::TargetWriter};
use engine_config::settings::tuning::TuningSettings;
use engine_core::{credentials::PasswordHasher, progress::Reporter};
use model::core::entity::Entity;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything an entity migration needs, handed in by the orchestrator.
#[derive(Clone)]
pub struct MigrationContext {
    pub source: Arc<dyn SourceReader>,
    pub target: Arc<dyn TargetWriter>,
    pub tuning: TuningSettings,
    pub hasher: PasswordHasher,
    pub reporter: Reporter,
    pub cancel: CancellationToken,
}

impl MigrationContext {
    pub fn new(
        source: Arc<dyn SourceReader>,
        target: Arc<dyn TargetWriter>,
        tuning: TuningSettings,
        reporter: Reporter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            target,
            hasher: PasswordHasher::new(tuning.hash_rounds),
            tuning,
            reporter,
            cancel,
        }
    }

    /// Same handles, with events tagged by `entity`.
    pub fn for_entity(&self, entity: Entity) -> Self {
        Self {
            reporter: self.reporter.for_entity(entity),
            ..self.clone()
        }
    }

    pub fn upserter(&self) -> BatchUpserter {
        BatchUpserter::new(
            Arc::clone(&self.target),
            self.tuning.batch_size,
            self.tuning.chunk_pause,
        )
        .with_reporter(self.reporter.clone())
        .with_cancel(self.cancel.clone())
    }
}
