use connectors::error::ConnectorError;
use engine_config::error::SettingsError;
use model::core::entity::UnknownEntity;
use thiserror::Error;

/// Errors that stop a run (or a single-entity run) before any report exists.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// One side could not be reached at startup; nothing was executed.
    #[error("Cannot reach {side}: {message}")]
    Connectivity { side: &'static str, message: String },

    #[error(transparent)]
    UnknownEntity(#[from] UnknownEntity),

    /// Pool or adapter setup failed.
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}
