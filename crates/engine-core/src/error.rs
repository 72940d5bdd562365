use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// Shifting produced a UTF-16 sequence with an unpaired surrogate.
    #[error("Shift by {shift} produced invalid UTF-16 at code unit {position}")]
    InvalidUtf16 { shift: u16, position: usize },
}

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    /// The blocking hash task panicked or was cancelled.
    #[error("Hash task failed: {0}")]
    Join(String),
}
