//! Provides a fluent builder for constructing `Insert` ASTs.

use crate::query::{
    ast::{
        common::TableRef,
        expr::Expr,
        insert::{ConflictAction, ConflictAssignment, Insert, OnConflict},
    },
    excluded,
};

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    ast: Insert,
}

impl InsertBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Insert {
                table,
                ..Default::default()
            },
        }
    }

    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.ast.columns = columns.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Adds a row of values to the insert statement.
    /// This can be called multiple times for a batch insert.
    pub fn values(mut self, values: Vec<Expr>) -> Self {
        self.ast.values.push(values);
        self
    }

    /// `ON CONFLICT (keys) DO UPDATE SET col = excluded.col` for each of `update`.
    pub fn on_conflict_update<S: AsRef<str>>(mut self, keys: &[S], update: &[S]) -> Self {
        let assignments = update
            .iter()
            .map(|c| ConflictAssignment {
                column: c.as_ref().to_string(),
                value: excluded(c.as_ref()),
            })
            .collect();
        self.ast.on_conflict = Some(OnConflict {
            columns: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            action: ConflictAction::DoUpdate { assignments },
        });
        self
    }

    pub fn build(self) -> Insert {
        self.ast
    }
}
