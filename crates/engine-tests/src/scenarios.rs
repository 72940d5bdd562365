#[cfg(test)]
mod tests {
    use crate::{
        fixtures::{city, cities, legacy_source, partner_source, tuning, user},
        memory::{MemorySource, MemoryTarget},
    };
    use connectors::error::WriteErrorKind;
    use engine_config::settings::tuning::TuningSettings;
    use engine_core::progress::{BufferedSink, Reporter};
    use engine_processing::entities::{geography, partners, users};
    use engine_runtime::{
        error::MigrationError,
        execution::orchestrator::{CANCELLED, CANCELLED_BEFORE_START, Orchestrator},
    };
    use model::{
        core::{entity::Entity, value::Value},
        events::progress::EventLevel,
        execution::report::MigrationResult,
    };
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    fn orchestrator(source: Arc<MemorySource>, target: Arc<MemoryTarget>) -> Orchestrator {
        orchestrator_with(source, target, tuning())
    }

    fn orchestrator_with(
        source: Arc<MemorySource>,
        target: Arc<MemoryTarget>,
        tuning: TuningSettings,
    ) -> Orchestrator {
        Orchestrator::new(source, target, tuning)
    }

    #[tokio::test]
    async fn test_partner_tax_id_collision_keeps_supplier() {
        let source = Arc::new(partner_source(MemorySource::new()));
        let target = Arc::new(MemoryTarget::with_schema());

        let report = orchestrator(source.clone(), target.clone())
            .run_one("partners")
            .await
            .unwrap();

        assert_eq!(report.result, Some(MigrationResult::succeeded(4)));
        assert_eq!(target.row_count("clifornec"), 4);
        assert_eq!(
            target.lookup("clifornec", "cgc", &Value::from("12345"), "razaosocial"),
            Some(Value::from("Fornecedor Um"))
        );
        assert_eq!(
            target.lookup("clifornec", "cgc", &Value::from("12345"), "email"),
            Some(Value::from("contato@empresa.com.br"))
        );
        assert_eq!(
            source.queries(),
            vec![partners::SUPPLIERS_QUERY, partners::CUSTOMERS_QUERY]
        );
    }

    #[tokio::test]
    async fn test_1500_rows_are_written_as_two_chunks() {
        let source = Arc::new(MemorySource::new().with(geography::QUERY, cities(1500)));
        let target = Arc::new(MemoryTarget::with_schema());

        let report = orchestrator(source, target.clone())
            .run_one("geography")
            .await
            .unwrap();

        assert_eq!(target.calls("cidadeestado"), vec![1000, 500]);
        assert_eq!(report.result, Some(MigrationResult::succeeded(1500)));
    }

    #[tokio::test]
    async fn test_failed_second_chunk_keeps_first_chunk_counts() {
        let source = Arc::new(MemorySource::new().with(geography::QUERY, cities(1500)));
        let target = Arc::new(
            MemoryTarget::with_schema().fail_call("cidadeestado", 2, WriteErrorKind::Connection),
        );

        let report = orchestrator(source, target.clone())
            .run_one("geography")
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(target.calls("cidadeestado"), vec![1000, 500]);
        assert_eq!(report.result, Some(MigrationResult::new(1000, 500)));
        assert_eq!(target.row_count("cidadeestado"), 1000);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_conflicting_chunk_falls_back_row_by_row() {
        // the second chunk carries id 1200 twice, which one upsert cannot apply
        let mut rows = cities(1500);
        rows.push(city(1200, "Duplicada", "PR"));
        let source = Arc::new(MemorySource::new().with(geography::QUERY, rows));
        let target = Arc::new(MemoryTarget::with_schema());

        let report = orchestrator(source, target.clone())
            .run_one("geography")
            .await
            .unwrap();

        let calls = target.calls("cidadeestado");
        assert_eq!(calls[..2], [1000, 501]);
        assert_eq!(calls.len(), 2 + 501);
        assert_eq!(report.result, Some(MigrationResult::new(1500, 1)));
        assert_eq!(target.row_count("cidadeestado"), 1500);
        assert!(logs_contain("inserting rows individually"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_user_without_password_is_skipped_and_not_counted() {
        let source = Arc::new(MemorySource::new().with(
            users::QUERY,
            vec![
                user("Ana Souza", Some("ana@empresa.com.br"), Some("senha123")),
                user("Carla", Some("carla@empresa.com.br"), None),
            ],
        ));
        let target = Arc::new(MemoryTarget::with_schema());
        let sink = Arc::new(BufferedSink::new());

        let report = orchestrator(source, target.clone())
            .with_reporter(Reporter::new(sink.clone()))
            .run_one("users")
            .await
            .unwrap();

        assert_eq!(report.result, Some(MigrationResult::succeeded(1)));
        assert_eq!(target.row_count("usuario"), 1);
        assert!(sink.events().iter().any(|e| {
            e.level == EventLevel::Warning
                && e.entity.as_deref() == Some("users")
                && e.message.contains("Missing password")
        }));
        assert!(logs_contain("Skipping row"));
    }

    #[tokio::test]
    async fn test_user_passwords_are_rehashed_and_emails_synthesized() {
        let source = Arc::new(MemorySource::new().with(
            users::QUERY,
            vec![user("Bruno Lima", None, Some("outra"))],
        ));
        let target = Arc::new(MemoryTarget::with_schema());

        orchestrator(source, target.clone()).run_one("users").await.unwrap();

        let row = &target.rows("usuario")[0];
        assert_eq!(row[1], Value::from("brunolima@dashboardfinanceiro.com"));
        let Value::String(hash) = &row[2] else {
            panic!("hash should be text");
        };
        assert!(bcrypt::verify("outra", hash).unwrap());
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_except_for_users() {
        let source = Arc::new(legacy_source());
        let target = Arc::new(MemoryTarget::with_schema());
        let orch = orchestrator(source, target.clone());

        let first = orch.run_all().await.unwrap();
        assert!(first.success, "{:?}", first.failed);
        let keyed = ["cidadeestado", "clifornec", "centrocusto", "plc", "tipopag"];
        let before: Vec<usize> = keyed.iter().map(|t| target.row_count(t)).collect();
        assert_eq!(before, vec![3, 4, 2, 2, 2]);
        assert_eq!(target.row_count("usuario"), 2);

        let second = orch.run_all().await.unwrap();
        assert!(second.success);
        let after: Vec<usize> = keyed.iter().map(|t| target.row_count(t)).collect();
        assert_eq!(before, after);
        // usuario has no conflict clause: every user lands again
        assert_eq!(target.row_count("usuario"), 4);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_names() {
        let target = Arc::new(MemoryTarget::with_schema());
        let first = Arc::new(MemorySource::new().with(geography::QUERY, vec![city(1, "Joinvile", "SC")]));
        orchestrator(first, target.clone()).run_one("geography").await.unwrap();

        let second = Arc::new(MemorySource::new().with(geography::QUERY, vec![city(1, "Joinville", "SC")]));
        orchestrator(second, target.clone()).run_one("cidadeEstado").await.unwrap();

        assert_eq!(target.row_count("cidadeestado"), 1);
        assert_eq!(
            target.lookup("cidadeestado", "id", &Value::Int(1), "nomecidade"),
            Some(Value::from("Joinville"))
        );
    }

    #[tokio::test]
    async fn test_partner_read_failure_is_isolated() {
        let source = Arc::new(
            legacy_source().failing(partners::CUSTOMERS_QUERY, "lock conflict on no wait transaction"),
        );
        let target = Arc::new(MemoryTarget::with_schema());

        let summary = orchestrator(source, target.clone()).run_all().await.unwrap();

        assert!(!summary.success);
        assert_eq!(summary.failed_names(), vec!["partners"]);
        for entity in [
            Entity::Geography,
            Entity::CostCenters,
            Entity::ChartOfAccounts,
            Entity::PaymentTypes,
            Entity::Users,
        ] {
            assert!(summary.report(entity).unwrap().success, "{entity} should succeed");
        }
        let partners = summary.report(Entity::Partners).unwrap();
        assert!(partners.result.is_none());
        assert!(partners.error.as_deref().unwrap().contains("lock conflict"));
        assert_eq!(target.row_count("clifornec"), 0);
    }

    #[tokio::test]
    async fn test_unreachable_source_aborts_before_any_write() {
        let source = Arc::new(legacy_source().unreachable());
        let target = Arc::new(MemoryTarget::with_schema());

        let err = orchestrator(source.clone(), target.clone())
            .run_all()
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Connectivity { side: "source", .. }));
        assert!(source.queries().is_empty());
        assert_eq!(target.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_counts_never_exceed_rows_after_dedup() {
        let source = Arc::new(legacy_source());
        let target = Arc::new(MemoryTarget::with_schema().fail_call("plc", 1, WriteErrorKind::Other));

        let summary = orchestrator(source, target).run_all().await.unwrap();

        // rows remaining after dedup and skipped transforms, per entity
        let remaining = [
            (Entity::Geography, 3),
            (Entity::Users, 2),
            (Entity::Partners, 4),
            (Entity::CostCenters, 2),
            (Entity::ChartOfAccounts, 2),
            (Entity::PaymentTypes, 2),
        ];
        for (entity, rows) in remaining {
            let result = summary.report(entity).unwrap().result.unwrap();
            assert!(result.total() <= rows, "{entity}: {result:?}");
        }
        assert_eq!(
            summary.report(Entity::ChartOfAccounts).unwrap().result,
            Some(MigrationResult::failed(2))
        );
    }

    #[tokio::test]
    async fn test_stop_signal_keeps_written_chunks() {
        let cancel = CancellationToken::new();
        let source = Arc::new(legacy_source().with(geography::QUERY, cities(2500)));
        let target = Arc::new(MemoryTarget::with_schema().cancel_after(1, cancel.clone()));

        let summary = orchestrator(source, target.clone())
            .with_cancel(cancel)
            .run_all()
            .await
            .unwrap();

        let geography = summary.report(Entity::Geography).unwrap();
        assert_eq!(geography.error.as_deref(), Some(CANCELLED));
        assert_eq!(geography.result, Some(MigrationResult::succeeded(1000)));
        assert_eq!(target.row_count("cidadeestado"), 1000);

        let partners = summary.report(Entity::Partners).unwrap();
        assert_eq!(partners.error.as_deref(), Some(CANCELLED_BEFORE_START));
        assert_eq!(target.row_count("clifornec"), 0);
    }

    #[tokio::test]
    async fn test_summary_serializes_for_callers() {
        let source = Arc::new(legacy_source());
        let target = Arc::new(MemoryTarget::with_schema());

        let summary = orchestrator(source, target).run_all().await.unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["entities"]["partners"]["result"]["success_count"], 4);
        assert!(json["run_id"].as_str().is_some_and(|id| id.len() == 36));
    }
}
