use engine_config::error::SettingsError;
use engine_runtime::error::MigrationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load environment: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Migration failed: {0}")]
    Runner(#[from] MigrationError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
