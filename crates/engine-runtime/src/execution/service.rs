use crate::{
    error::MigrationError,
    execution::{
        factory::{create_source, create_target},
        orchestrator::Orchestrator,
    },
};
use connectors::{source::SourceReader, target::TargetWriter};
use engine_config::settings::{MigrationSettings, tuning::TuningSettings};
use engine_core::progress::Reporter;
use model::execution::{report::EntityReport, summary::MigrationSummary};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Result of pinging each side without running anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub source: Result<(), String>,
    pub target: Result<(), String>,
}

impl ConnectionCheck {
    pub fn is_ok(&self) -> bool {
        self.source.is_ok() && self.target.is_ok()
    }
}

/// Entry point for callers (CLI, scheduler, HTTP handler). Owns the pools.
pub struct MigrationService {
    source: Arc<dyn SourceReader>,
    target: Arc<dyn TargetWriter>,
    orchestrator: Orchestrator,
}

impl MigrationService {
    pub fn new(
        source: Arc<dyn SourceReader>,
        target: Arc<dyn TargetWriter>,
        tuning: TuningSettings,
        reporter: Reporter,
        cancel: CancellationToken,
    ) -> Self {
        let orchestrator = Orchestrator::new(Arc::clone(&source), Arc::clone(&target), tuning)
            .with_reporter(reporter)
            .with_cancel(cancel);
        Self {
            source,
            target,
            orchestrator,
        }
    }

    /// Builds both pools from settings. Pools connect lazily, so this does
    /// not touch the network.
    pub fn from_settings(
        settings: &MigrationSettings,
        reporter: Reporter,
        cancel: CancellationToken,
    ) -> Result<Self, MigrationError> {
        let source = create_source(&settings.source, settings.tuning.query_timeout)?;
        let target = create_target(&settings.target)?;
        Ok(Self::new(
            source,
            target,
            settings.tuning.clone(),
            reporter,
            cancel,
        ))
    }

    pub async fn execute_full_migration(&self) -> Result<MigrationSummary, MigrationError> {
        self.orchestrator.run_all().await
    }

    pub async fn execute_entity_migration(&self, name: &str) -> Result<EntityReport, MigrationError> {
        self.orchestrator.run_one(name).await
    }

    pub async fn test_connections(&self) -> ConnectionCheck {
        let (source, target) = tokio::join!(self.source.ping(), self.target.ping());
        ConnectionCheck {
            source: source.map_err(|e| e.to_string()),
            target: target.map_err(|e| e.to_string()),
        }
    }

    /// Releases both pools. Call once, after the last migration.
    pub async fn close(&self) {
        tokio::join!(self.source.close(), self.target.close());
        info!("Connection pools closed");
    }
}
