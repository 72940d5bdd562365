#[cfg(test)]
mod tests {
    use crate::execution::service::MigrationService;
    use async_trait::async_trait;
    use connectors::{
        error::{ReadError, WriteError},
        source::SourceReader,
        target::TargetWriter,
    };
    use engine_config::settings::tuning::TuningSettings;
    use engine_core::progress::Reporter;
    use model::records::row::SourceRow;
    use planner::query::ast::insert::Insert;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct Closable {
        closed: AtomicBool,
    }

    #[async_trait]
    impl SourceReader for Closable {
        async fn query(&self, _sql: &str) -> Result<Vec<SourceRow>, ReadError> {
            Ok(Vec::new())
        }

        async fn ping(&self) -> Result<(), ReadError> {
            Err(ReadError::Timeout(std::time::Duration::from_secs(1)))
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct Healthy {
        closed: AtomicBool,
    }

    #[async_trait]
    impl TargetWriter for Healthy {
        async fn insert(&self, stmt: &Insert) -> Result<u64, WriteError> {
            Ok(stmt.row_count() as u64)
        }

        async fn ping(&self) -> Result<(), WriteError> {
            Ok(())
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_connection_check_reports_each_side() {
        let source = Arc::new(Closable::default());
        let target = Arc::new(Healthy::default());
        let service = MigrationService::new(
            source.clone(),
            target.clone(),
            TuningSettings::default(),
            Reporter::silent(),
            CancellationToken::new(),
        );

        let check = service.test_connections().await;
        assert!(!check.is_ok());
        assert_eq!(
            check.source,
            Err("Source query timed out after 1000ms".to_string())
        );
        assert_eq!(check.target, Ok(()));

        service.close().await;
        assert!(source.closed.load(Ordering::SeqCst));
        assert!(target.closed.load(Ordering::SeqCst));
    }
}
