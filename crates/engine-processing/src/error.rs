use connectors::error::ReadError;
use engine_core::error::HashError;
use model::execution::report::MigrationResult;
use thiserror::Error;

/// Why a single source row was skipped. Never counted as a write error.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Missing required field {0}")]
    MissingField(&'static str),

    #[error("Field {field} is not an integer: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("Missing password")]
    MissingPassword,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] HashError),
}

/// Failures that end one entity's migration early.
#[derive(Debug, Error)]
pub enum EntityError {
    /// Reading from the legacy store failed; nothing was written.
    #[error(transparent)]
    Source(#[from] ReadError),

    /// A stop was requested; chunks already written stay written.
    #[error("cancelled after {} rows written", .partial.success_count)]
    Cancelled { partial: MigrationResult },
}

impl EntityError {
    pub fn partial_result(&self) -> Option<MigrationResult> {
        match self {
            EntityError::Cancelled { partial } => Some(*partial),
            EntityError::Source(_) => None,
        }
    }
}
