use crate::error::ReadError;
use async_trait::async_trait;
use model::records::row::SourceRow;

/// Read access to the legacy store.
///
/// Implementations own a bounded pool; every call checks a connection out
/// and returns it before resolving, whatever the outcome.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Runs one read query and returns every row it produced.
    async fn query(&self, sql: &str) -> Result<Vec<SourceRow>, ReadError>;

    /// Verifies a connection can be obtained and used.
    async fn ping(&self) -> Result<(), ReadError>;

    /// Releases pooled connections.
    async fn close(&self) {}

    fn describe(&self) -> String {
        "source".to_string()
    }
}
