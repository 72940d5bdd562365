use thiserror::Error;

/// Errors raised while reading migration settings from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A variable with no default was not set.
    #[error("Missing required setting: {0}")]
    Missing(String),

    /// A variable was set but its value is unusable.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}
