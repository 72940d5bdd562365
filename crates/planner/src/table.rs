//! Target table descriptions and the statements written against them.

use crate::query::{
    ast::{common::TableRef, insert::Insert},
    builder::insert::InsertBuilder,
    value,
};
use model::records::row::TargetRecord;

/// Bind parameters one statement can carry; the wire protocol counts them
/// in an `i16`.
pub const MAX_BIND_PARAMS: usize = i16::MAX as usize;

/// How a multi-row insert resolves rows whose natural key already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Plain insert; a duplicate key fails the statement.
    None,
    /// Overwrite `update` columns of the existing row.
    Update { keys: Vec<String>, update: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    pub name: String,
    pub columns: Vec<String>,
    pub conflict: ConflictPolicy,
}

impl TargetTable {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        TargetTable {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            conflict: ConflictPolicy::None,
        }
    }

    /// Upsert keyed on `key`, updating every other column.
    pub fn upsert_on(mut self, key: &str) -> Self {
        let update = self
            .columns
            .iter()
            .filter(|c| !c.eq_ignore_ascii_case(key))
            .cloned()
            .collect();
        self.conflict = ConflictPolicy::Update {
            keys: vec![key.to_string()],
            update,
        };
        self
    }

    /// Most rows a single [`batch_insert`](Self::batch_insert) can hold
    /// without exceeding [`MAX_BIND_PARAMS`].
    pub fn max_rows_per_statement(&self) -> usize {
        (MAX_BIND_PARAMS / self.columns.len().max(1)).max(1)
    }

    /// Multi-row statement carrying this table's conflict clause.
    pub fn batch_insert(&self, rows: &[TargetRecord]) -> Insert {
        let builder = self.rows_into(InsertBuilder::new(TableRef::new(&self.name)), rows);
        match &self.conflict {
            ConflictPolicy::None => builder.build(),
            ConflictPolicy::Update { keys, update } => {
                builder.on_conflict_update(keys, update).build()
            }
        }
    }

    /// Single-row statement without any conflict clause, used when a
    /// batch has to be retried one row at a time.
    pub fn single_insert(&self, row: &TargetRecord) -> Insert {
        self.rows_into(
            InsertBuilder::new(TableRef::new(&self.name)),
            std::slice::from_ref(row),
        )
        .build()
    }

    fn rows_into(&self, builder: InsertBuilder, rows: &[TargetRecord]) -> InsertBuilder {
        rows.iter().fold(builder.columns(&self.columns), |b, row| {
            b.values(row.iter().cloned().map(value).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{dialect::Postgres, renderer::Renderer};
    use model::core::value::Value;

    fn table() -> TargetTable {
        TargetTable::new("clifornec", &["cgc", "razaosocial", "email"]).upsert_on("cgc")
    }

    #[test]
    fn test_upsert_on_updates_non_key_columns() {
        match table().conflict {
            ConflictPolicy::Update { keys, update } => {
                assert_eq!(keys, vec!["cgc"]);
                assert_eq!(update, vec!["razaosocial", "email"]);
            }
            other => panic!("unexpected policy: {other:?}"),
        }
    }

    #[test]
    fn test_batch_insert_renders_every_row() {
        let rows = vec![
            vec![Value::from("1"), Value::from("A"), Value::Null],
            vec![Value::from("2"), Value::from("B"), Value::from("b@x")],
        ];
        let (sql, params) = Renderer::render_node(&Postgres, &table().batch_insert(&rows));
        assert!(sql.contains("VALUES ($1, $2, $3), ($4, $5, $6)"));
        assert!(sql.contains(r#"ON CONFLICT ("cgc") DO UPDATE SET"#));
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn test_max_rows_per_statement_respects_bind_limit() {
        assert_eq!(table().max_rows_per_statement(), 10922);
        let wide = TargetTable::new("clifornec", &["c"; 10]);
        assert_eq!(wide.max_rows_per_statement(), 3276);
    }

    #[test]
    fn test_single_insert_drops_conflict_clause() {
        let row = vec![Value::from("1"), Value::from("A"), Value::Null];
        let insert = table().single_insert(&row);
        assert!(insert.on_conflict.is_none());
        assert_eq!(insert.row_count(), 1);
    }
}
