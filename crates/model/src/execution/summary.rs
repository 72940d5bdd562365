use crate::{
    core::entity::Entity,
    execution::report::{EntityReport, MigrationResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEntity {
    pub entity: Entity,
    pub error: String,
}

/// Whole-run result: every attempted entity plus the overall verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub run_id: String,
    pub success: bool,
    pub entities: BTreeMap<Entity, EntityReport>,
    pub failed: Vec<FailedEntity>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MigrationSummary {
    /// Builds a summary from reports in the order they completed.
    pub fn from_reports(
        run_id: impl Into<String>,
        reports: Vec<EntityReport>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let failed = reports
            .iter()
            .filter(|r| !r.success)
            .map(|r| FailedEntity {
                entity: r.entity,
                error: r.error.clone().unwrap_or_else(|| "unknown error".into()),
            })
            .collect::<Vec<_>>();

        Self {
            run_id: run_id.into(),
            success: failed.is_empty(),
            entities: reports.into_iter().map(|r| (r.entity, r)).collect(),
            failed,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn report(&self, entity: Entity) -> Option<&EntityReport> {
        self.entities.get(&entity)
    }

    /// Per-entity counts, keyed by entity name, for status events.
    pub fn status(&self) -> BTreeMap<String, MigrationResult> {
        self.entities
            .iter()
            .filter_map(|(entity, report)| report.result.map(|r| (entity.to_string(), r)))
            .collect()
    }

    pub fn totals(&self) -> MigrationResult {
        self.entities.values().filter_map(|r| r.result).sum()
    }

    pub fn failed_names(&self) -> Vec<&'static str> {
        self.failed.iter().map(|f| f.entity.as_str()).collect()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_success_requires_every_entity() {
        let reports = vec![
            EntityReport::completed(Entity::Geography, MigrationResult::succeeded(10)),
            EntityReport::failed(Entity::Partners, "connection refused"),
            EntityReport::completed(Entity::Users, MigrationResult::new(4, 1)),
        ];
        let summary = MigrationSummary::from_reports("run-1", reports, Utc::now());

        assert!(!summary.success);
        assert_eq!(summary.entities.len(), 3);
        assert_eq!(summary.failed_names(), vec!["partners"]);
        assert_eq!(summary.totals(), MigrationResult::new(14, 1));

        let status = summary.status();
        assert_eq!(status.len(), 2);
        assert_eq!(status["users"], MigrationResult::new(4, 1));
    }

    #[test]
    fn test_summary_all_succeeded() {
        let reports = vec![EntityReport::completed(
            Entity::CostCenters,
            MigrationResult::default(),
        )];
        let summary = MigrationSummary::from_reports("run-2", reports, Utc::now());
        assert!(summary.success);
        assert!(summary.failed.is_empty());
    }
}
