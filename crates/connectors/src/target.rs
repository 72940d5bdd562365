use crate::error::WriteError;
use async_trait::async_trait;
use planner::query::ast::insert::Insert;

/// Write access to the target schema.
#[async_trait]
pub trait TargetWriter: Send + Sync {
    /// Executes one insert statement atomically and returns the rows affected.
    async fn insert(&self, stmt: &Insert) -> Result<u64, WriteError>;

    async fn ping(&self) -> Result<(), WriteError>;

    async fn close(&self) {}

    fn describe(&self) -> String {
        "target".to_string()
    }
}
