#[cfg(test)]
mod tests {
    use crate::{
        error::MigrationError,
        execution::orchestrator::{
            CANCELLED, CANCELLED_BEFORE_START, Orchestrator, dependency_waves,
        },
    };
    use async_trait::async_trait;
    use connectors::{
        error::{ReadError, WriteError, WriteErrorKind},
        source::SourceReader,
        target::TargetWriter,
    };
    use engine_config::settings::tuning::TuningSettings;
    use engine_core::progress::{BufferedSink, Reporter};
    use engine_processing::{
        context::MigrationContext,
        entities::{Migrator, all_migrators},
        error::EntityError,
    };
    use model::{
        core::entity::Entity,
        events::progress::EventLevel,
        execution::report::MigrationResult,
        records::row::SourceRow,
    };
    use planner::query::ast::insert::Insert;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    struct FakeSource {
        reachable: bool,
    }

    #[async_trait]
    impl SourceReader for FakeSource {
        async fn query(&self, _sql: &str) -> Result<Vec<SourceRow>, ReadError> {
            Ok(Vec::new())
        }

        async fn ping(&self) -> Result<(), ReadError> {
            if self.reachable {
                Ok(())
            } else {
                Err(ReadError::Connection("connection refused".into()))
            }
        }
    }

    struct FakeTarget {
        reachable: bool,
    }

    #[async_trait]
    impl TargetWriter for FakeTarget {
        async fn insert(&self, stmt: &Insert) -> Result<u64, WriteError> {
            Ok(stmt.row_count() as u64)
        }

        async fn ping(&self) -> Result<(), WriteError> {
            if self.reachable {
                Ok(())
            } else {
                Err(WriteError::new(WriteErrorKind::Connection, "connection refused"))
            }
        }
    }

    #[derive(Clone)]
    enum Behavior {
        Succeed(MigrationResult),
        Slow(Duration, MigrationResult),
        FailRead,
        Cancelled(MigrationResult),
        Panic,
    }

    type Log = Arc<Mutex<Vec<String>>>;

    struct FakeMigrator {
        entity: Entity,
        behavior: Behavior,
        log: Log,
    }

    #[async_trait]
    impl Migrator for FakeMigrator {
        fn entity(&self) -> Entity {
            self.entity
        }

        async fn migrate(&self, _ctx: &MigrationContext) -> Result<MigrationResult, EntityError> {
            self.log.lock().unwrap().push(format!("start {}", self.entity));
            let outcome = match self.behavior.clone() {
                Behavior::Succeed(result) => Ok(result),
                Behavior::Slow(delay, result) => {
                    tokio::time::sleep(delay).await;
                    Ok(result)
                }
                Behavior::FailRead => Err(EntityError::Source(ReadError::Query(
                    "table CLIENTE is locked".into(),
                ))),
                Behavior::Cancelled(partial) => Err(EntityError::Cancelled { partial }),
                Behavior::Panic => panic!("decoder blew up"),
            };
            self.log.lock().unwrap().push(format!("end {}", self.entity));
            outcome
        }
    }

    fn migrators(log: &Log, overrides: &[(Entity, Behavior)]) -> Vec<Arc<dyn Migrator>> {
        Entity::ALL
            .into_iter()
            .map(|entity| {
                let behavior = overrides
                    .iter()
                    .find(|(e, _)| *e == entity)
                    .map(|(_, b)| b.clone())
                    .unwrap_or(Behavior::Succeed(MigrationResult::succeeded(10)));
                Arc::new(FakeMigrator {
                    entity,
                    behavior,
                    log: log.clone(),
                }) as Arc<dyn Migrator>
            })
            .collect()
    }

    fn orchestrator(source_up: bool, target_up: bool) -> Orchestrator {
        Orchestrator::new(
            Arc::new(FakeSource { reachable: source_up }),
            Arc::new(FakeTarget { reachable: target_up }),
            TuningSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_unreachable_source_runs_nothing() {
        let log = Log::default();
        let orch = orchestrator(false, true).with_migrators(migrators(&log, &[]));

        let err = orch.run_all().await.unwrap_err();

        assert!(matches!(err, MigrationError::Connectivity { side: "source", .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_target_runs_nothing() {
        let log = Log::default();
        let orch = orchestrator(true, false).with_migrators(migrators(&log, &[]));

        let err = orch.run_one("users").await.unwrap_err();

        assert!(matches!(err, MigrationError::Connectivity { side: "target", .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_source_failure_is_isolated_to_its_entity() {
        let log = Log::default();
        let orch = orchestrator(true, true)
            .with_migrators(migrators(&log, &[(Entity::Partners, Behavior::FailRead)]));

        let summary = orch.run_all().await.unwrap();

        assert!(!summary.success);
        assert_eq!(summary.failed_names(), vec!["partners"]);
        assert_eq!(summary.entities.len(), 6);
        let partners = summary.report(Entity::Partners).unwrap();
        assert!(partners.result.is_none());
        assert!(partners.error.as_deref().unwrap().contains("CLIENTE is locked"));
        for entity in Entity::ALL.into_iter().filter(|e| *e != Entity::Partners) {
            let report = summary.report(entity).unwrap();
            assert!(report.success, "{entity} should have succeeded");
            assert_eq!(report.result, Some(MigrationResult::succeeded(10)));
        }
        assert!(logs_contain("Entity migration failed"));
    }

    #[tokio::test]
    async fn test_geography_finishes_before_partners_start() {
        let log = Log::default();
        let tuning = TuningSettings {
            entity_concurrency: 6,
            ..TuningSettings::default()
        };
        let orch = Orchestrator::new(
            Arc::new(FakeSource { reachable: true }),
            Arc::new(FakeTarget { reachable: true }),
            tuning,
        )
        .with_migrators(migrators(
            &log,
            &[(
                Entity::Geography,
                Behavior::Slow(Duration::from_millis(50), MigrationResult::succeeded(3)),
            )],
        ));

        let summary = orch.run_all().await.unwrap();
        assert!(summary.success);

        let log = log.lock().unwrap();
        let position = |line: &str| log.iter().position(|l| l == line).unwrap();
        assert!(position("end geography") < position("start partners"));
    }

    #[tokio::test]
    async fn test_panicking_entity_becomes_failed_report() {
        let log = Log::default();
        let orch = orchestrator(true, true)
            .with_migrators(migrators(&log, &[(Entity::Users, Behavior::Panic)]));

        let summary = orch.run_all().await.unwrap();

        assert_eq!(summary.failed_names(), vec!["users"]);
        assert!(summary.report(Entity::PaymentTypes).unwrap().success);
    }

    #[tokio::test]
    async fn test_stop_before_run_marks_everything_not_started() {
        let log = Log::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let orch = orchestrator(true, true)
            .with_migrators(migrators(&log, &[]))
            .with_cancel(cancel);

        let summary = orch.run_all().await.unwrap();

        assert!(!summary.success);
        assert!(
            summary
                .entities
                .values()
                .all(|r| r.error.as_deref() == Some(CANCELLED_BEFORE_START))
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_entity_keeps_partial_counts() {
        let log = Log::default();
        let orch = orchestrator(true, true).with_migrators(migrators(
            &log,
            &[(Entity::Geography, Behavior::Cancelled(MigrationResult::succeeded(1000)))],
        ));

        let report = orch.run_one("geography").await.unwrap();

        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some(CANCELLED));
        assert_eq!(report.result, Some(MigrationResult::succeeded(1000)));
    }

    #[tokio::test]
    async fn test_run_one_accepts_legacy_names() {
        let log = Log::default();
        let orch = orchestrator(true, true).with_migrators(migrators(&log, &[]));

        let report = orch.run_one("CLIFORNEC").await.unwrap();
        assert_eq!(report.entity, Entity::Partners);
        assert!(report.success);
        assert_eq!(*log.lock().unwrap(), vec!["start partners", "end partners"]);

        let err = orch.run_one("invoices").await.unwrap_err();
        assert!(matches!(err, MigrationError::UnknownEntity(_)));
    }

    #[tokio::test]
    async fn test_final_event_carries_status() {
        let log = Log::default();
        let sink = Arc::new(BufferedSink::new());
        let orch = orchestrator(true, true)
            .with_migrators(migrators(&log, &[]))
            .with_reporter(Reporter::new(sink.clone()));

        let summary = orch.run_all().await.unwrap();

        let events = sink.events();
        let last = events.last().unwrap();
        assert_eq!(last.level, EventLevel::Success);
        let status = last.status.as_ref().unwrap();
        assert_eq!(status.len(), 6);
        assert_eq!(status["partners"], MigrationResult::succeeded(10));
        assert_eq!(summary.totals(), MigrationResult::succeeded(60));
    }

    #[test]
    fn test_dependency_waves() {
        let waves = dependency_waves(&all_migrators());
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].len(), 5);
        assert_eq!(waves[1][0].entity(), Entity::Partners);

        let subset: Vec<_> = all_migrators()
            .into_iter()
            .filter(|m| m.entity() != Entity::Geography)
            .collect();
        assert_eq!(dependency_waves(&subset).len(), 1);
    }
}
