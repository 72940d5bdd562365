//! Defines the AST for an INSERT statement.

use crate::query::ast::{common::TableRef, expr::Expr};

/// Represents a complete INSERT statement.
///
/// This structure supports both single-row and multi-row (batch) inserts
/// through the `values` field, which is a list of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    /// The rows of values to be inserted. Each inner vector represents a single row.
    pub values: Vec<Vec<Expr>>,
    /// Optional ON CONFLICT clause for handling conflicts.
    pub on_conflict: Option<OnConflict>,
}

impl Insert {
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Column position, matched case-insensitively.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    pub columns: Vec<String>,
    pub action: ConflictAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    /// An empty assignment list renders as `DO NOTHING`.
    DoUpdate {
        assignments: Vec<ConflictAssignment>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictAssignment {
    pub column: String,
    pub value: Expr,
}
