use std::{fmt, time::Duration};
use thiserror::Error;

/// Errors happening during adapter or pool setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The connection string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS connector construction failed.
    #[error("TLS configuration error: {0}")]
    TlsConfig(#[from] native_tls::Error),

    /// The connection pool could not be built.
    #[error("Pool configuration error: {0}")]
    Pool(String),
}

/// Failures of a single read against the legacy store.
#[derive(Debug, Error)]
pub enum ReadError {
    /// No pooled connection could be obtained.
    #[error("Source connection error: {0}")]
    Connection(String),

    /// The query did not finish within the configured bound.
    #[error("Source query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The store rejected or failed the query.
    #[error("Source query failed: {0}")]
    Query(String),
}

/// What kind of failure a target write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorKind {
    /// A row collided with an existing natural key.
    UniqueViolation,
    /// One upsert statement touched the same key twice.
    ConflictCardinality,
    /// The target could not be reached or the connection dropped.
    Connection,
    Other,
}

impl WriteErrorKind {
    /// Kinds that the batch upserter can recover from row by row.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            WriteErrorKind::UniqueViolation | WriteErrorKind::ConflictCardinality
        )
    }

    /// Last-resort classification for drivers that hand back only a message.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("on conflict") {
            WriteErrorKind::ConflictCardinality
        } else if lower.contains("unique constraint")
            || lower.contains("duplicate key")
            || lower.contains("already exists")
        {
            WriteErrorKind::UniqueViolation
        } else {
            WriteErrorKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteErrorKind::UniqueViolation => "unique violation",
            WriteErrorKind::ConflictCardinality => "conflict cardinality violation",
            WriteErrorKind::Connection => "connection error",
            WriteErrorKind::Other => "write error",
        }
    }
}

impl fmt::Display for WriteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct WriteError {
    pub kind: WriteErrorKind,
    pub message: String,
}

impl WriteError {
    pub fn new(kind: WriteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind.is_conflict()
    }
}
