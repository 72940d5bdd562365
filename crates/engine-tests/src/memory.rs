//! In-memory source and target that behave like the real stores closely
//! enough for whole-run scenarios: the target applies the INSERT AST with
//! unique keys, `DO UPDATE`, `DO NOTHING` and the cardinality rule.

use async_trait::async_trait;
use connectors::{
    error::{ReadError, WriteError, WriteErrorKind},
    source::SourceReader,
    target::TargetWriter,
};
use model::{core::value::Value, records::row::SourceRow};
use planner::query::ast::{
    expr::Expr,
    insert::{ConflictAction, Insert},
};
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub struct MemorySource {
    answers: HashMap<String, Vec<SourceRow>>,
    failures: HashMap<String, String>,
    unreachable: bool,
    log: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sql: &str, rows: Vec<SourceRow>) -> Self {
        self.answers.insert(sql.to_string(), rows);
        self
    }

    /// Makes `sql` fail as if the store rejected it.
    pub fn failing(mut self, sql: &str, message: &str) -> Self {
        self.failures.insert(sql.to_string(), message.to_string());
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceReader for MemorySource {
    async fn query(&self, sql: &str) -> Result<Vec<SourceRow>, ReadError> {
        self.log.lock().unwrap().push(sql.to_string());
        if let Some(message) = self.failures.get(sql) {
            return Err(ReadError::Query(message.clone()));
        }
        Ok(self.answers.get(sql).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), ReadError> {
        if self.unreachable {
            Err(ReadError::Connection("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        "memory source".into()
    }
}

#[derive(Debug, Clone, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Table>,
    calls: HashMap<String, Vec<usize>>,
}

pub struct MemoryTarget {
    unique_keys: HashMap<String, String>,
    failures: HashMap<(String, usize), WriteErrorKind>,
    cancel_after: Option<(usize, CancellationToken)>,
    unreachable: bool,
    state: Mutex<State>,
}

impl Default for MemoryTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self {
            unique_keys: HashMap::new(),
            failures: HashMap::new(),
            cancel_after: None,
            unreachable: false,
            state: Mutex::new(State::default()),
        }
    }

    /// The target schema's natural keys. `usuario` has none.
    pub fn with_schema() -> Self {
        Self::new()
            .with_unique("cidadeestado", "id")
            .with_unique("clifornec", "cgc")
            .with_unique("centrocusto", "id")
            .with_unique("plc", "codiconta")
            .with_unique("tipopag", "id")
    }

    pub fn with_unique(mut self, table: &str, column: &str) -> Self {
        self.unique_keys.insert(table.to_string(), column.to_string());
        self
    }

    /// Fails the `call`-th (1-based) statement against `table`.
    pub fn fail_call(mut self, table: &str, call: usize, kind: WriteErrorKind) -> Self {
        self.failures.insert((table.to_string(), call), kind);
        self
    }

    /// Fires `token` once `calls` statements have been applied, in total.
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Vec<Value>> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    /// Value of `column` in the row whose key column equals `key`.
    pub fn lookup(&self, table: &str, key_column: &str, key: &Value, column: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        let table = state.tables.get(table)?;
        let k = table.columns.iter().position(|c| c == key_column)?;
        let c = table.columns.iter().position(|c| c == column)?;
        table
            .rows
            .iter()
            .find(|row| &row[k] == key)
            .map(|row| row[c].clone())
    }

    /// Row count of every statement sent to `table`, in order.
    pub fn calls(&self, table: &str) -> Vec<usize> {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().map(Vec::len).sum()
    }

    fn key_column(&self, stmt: &Insert) -> Option<String> {
        match &stmt.on_conflict {
            Some(conflict) => conflict.columns.first().cloned(),
            None => self.unique_keys.get(&stmt.table.name).cloned(),
        }
    }

    fn apply(&self, table: &mut Table, stmt: &Insert) -> Result<u64, WriteError> {
        let rows: Vec<Vec<Value>> = stmt
            .values
            .iter()
            .map(|row| row.iter().map(bound_value).collect())
            .collect();

        let Some(key) = self.key_column(stmt) else {
            table.rows.extend(rows);
            return Ok(stmt.row_count() as u64);
        };
        let k = stmt.column_index(&key).ok_or_else(|| {
            WriteError::new(WriteErrorKind::Other, format!("column \"{key}\" does not exist"))
        })?;

        if let Some(conflict) = &stmt.on_conflict
            && matches!(conflict.action, ConflictAction::DoUpdate { .. })
        {
            let mut seen = HashSet::new();
            if rows.iter().any(|row| !seen.insert(row[k].to_string())) {
                return Err(WriteError::new(
                    WriteErrorKind::ConflictCardinality,
                    "ON CONFLICT DO UPDATE command cannot affect row a second time",
                ));
            }
        }

        let mut affected = 0;
        for row in rows {
            let existing = table.rows.iter().position(|r| r[k] == row[k]);
            match (existing, &stmt.on_conflict) {
                (None, _) => {
                    table.rows.push(row);
                    affected += 1;
                }
                (Some(_), None) => {
                    return Err(WriteError::new(
                        WriteErrorKind::UniqueViolation,
                        format!(
                            "duplicate key value violates unique constraint \"{}_pkey\"",
                            stmt.table.name
                        ),
                    ));
                }
                (Some(index), Some(conflict)) => {
                    let ConflictAction::DoUpdate { assignments } = &conflict.action;
                    if assignments.is_empty() {
                        continue;
                    }
                    for assignment in assignments {
                        let target = stmt.column_index(&assignment.column);
                        let source = match &assignment.value {
                            Expr::Identifier(ident) => stmt.column_index(&ident.name),
                            _ => None,
                        };
                        if let (Some(t), Some(s)) = (target, source) {
                            table.rows[index][t] = row[s].clone();
                        }
                    }
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }
}

fn bound_value(expr: &Expr) -> Value {
    match expr {
        Expr::Value(value) => value.clone(),
        _ => Value::Null,
    }
}

#[async_trait]
impl TargetWriter for MemoryTarget {
    async fn insert(&self, stmt: &Insert) -> Result<u64, WriteError> {
        let name = stmt.table.name.clone();
        let result = {
            let mut state = self.state.lock().unwrap();
            let calls = state.calls.entry(name.clone()).or_default();
            calls.push(stmt.row_count());
            let call = calls.len();

            if let Some(kind) = self.failures.get(&(name.clone(), call)) {
                Err(WriteError::new(*kind, format!("injected failure on call {call}")))
            } else {
                // statements are atomic: work on a copy, keep it only on success
                let mut table = state.tables.get(&name).cloned().unwrap_or_else(|| Table {
                    columns: stmt.columns.clone(),
                    rows: Vec::new(),
                });
                let applied = self.apply(&mut table, stmt);
                if applied.is_ok() {
                    state.tables.insert(name, table);
                }
                applied
            }
        };

        if let Some((after, token)) = &self.cancel_after
            && self.total_calls() >= *after
        {
            token.cancel();
        }
        result
    }

    async fn ping(&self) -> Result<(), WriteError> {
        if self.unreachable {
            Err(WriteError::new(WriteErrorKind::Connection, "connection refused"))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        "memory target".into()
    }
}
