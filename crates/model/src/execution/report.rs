use crate::core::entity::Entity;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Written and failed row counts for one entity (or one chunk of it).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    pub success_count: u64,
    pub error_count: u64,
}

impl MigrationResult {
    pub fn new(success_count: u64, error_count: u64) -> Self {
        Self {
            success_count,
            error_count,
        }
    }

    pub fn succeeded(rows: u64) -> Self {
        Self::new(rows, 0)
    }

    pub fn failed(rows: u64) -> Self {
        Self::new(0, rows)
    }

    pub fn total(&self) -> u64 {
        self.success_count + self.error_count
    }
}

impl AddAssign for MigrationResult {
    fn add_assign(&mut self, rhs: Self) {
        self.success_count += rhs.success_count;
        self.error_count += rhs.error_count;
    }
}

impl std::iter::Sum for MigrationResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MigrationResult::default(), |mut acc, r| {
            acc += r;
            acc
        })
    }
}

/// Outcome of one entity's migration, produced whether or not others failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: Entity,
    pub success: bool,
    pub result: Option<MigrationResult>,
    pub error: Option<String>,
}

impl EntityReport {
    pub fn completed(entity: Entity, result: MigrationResult) -> Self {
        Self {
            entity,
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(entity: Entity, error: impl Into<String>) -> Self {
        Self {
            entity,
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// A failure that still wrote some chunks before stopping.
    pub fn partial(entity: Entity, result: MigrationResult, error: impl Into<String>) -> Self {
        Self {
            entity,
            success: false,
            result: Some(result),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_sum() {
        let total: MigrationResult = [
            MigrationResult::succeeded(1000),
            MigrationResult::new(200, 300),
            MigrationResult::default(),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, MigrationResult::new(1200, 300));
        assert_eq!(total.total(), 1500);
    }

    #[test]
    fn test_report_constructors() {
        let ok = EntityReport::completed(Entity::Users, MigrationResult::succeeded(3));
        assert!(ok.success && ok.error.is_none());

        let failed = EntityReport::failed(Entity::Partners, "query timed out");
        assert!(!failed.success);
        assert!(failed.result.is_none());
        assert_eq!(failed.error.as_deref(), Some("query timed out"));
    }
}
