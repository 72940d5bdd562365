//! Scripted collaborators for unit tests.

use async_trait::async_trait;
use connectors::{
    error::{ReadError, WriteError},
    source::SourceReader,
    target::TargetWriter,
};
use model::records::row::SourceRow;
use planner::query::ast::insert::Insert;
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};
use tokio_util::sync::CancellationToken;

pub enum Step {
    Ok,
    Fail(WriteError),
}

/// Target that answers from a script, then succeeds with every row affected.
#[derive(Default)]
pub struct ScriptedTarget {
    script: Mutex<VecDeque<Step>>,
    statements: Mutex<Vec<Insert>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedTarget {
    pub fn scripted(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    /// Fires `token` once `calls` statements have been executed.
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Row count of every statement received, in order.
    pub fn calls(&self) -> Vec<usize> {
        self.statements().iter().map(Insert::row_count).collect()
    }

    pub fn statements(&self) -> Vec<Insert> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl TargetWriter for ScriptedTarget {
    async fn insert(&self, stmt: &Insert) -> Result<u64, WriteError> {
        let seen = {
            let mut statements = self.statements.lock().unwrap();
            statements.push(stmt.clone());
            statements.len()
        };
        if let Some((after, token)) = &self.cancel_after
            && seen >= *after
        {
            token.cancel();
        }
        match self.script.lock().unwrap().pop_front() {
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Ok) | None => Ok(stmt.row_count() as u64),
        }
    }

    async fn ping(&self) -> Result<(), WriteError> {
        Ok(())
    }
}

/// Source that answers each query with fixed rows, or a failure.
#[derive(Default)]
pub struct StaticSource {
    answers: HashMap<String, Vec<SourceRow>>,
    failing: Option<String>,
    pub queries: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn with(mut self, sql: &str, rows: Vec<SourceRow>) -> Self {
        self.answers.insert(sql.to_string(), rows);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failing = Some(message.to_string());
        self
    }
}

#[async_trait]
impl SourceReader for StaticSource {
    async fn query(&self, sql: &str) -> Result<Vec<SourceRow>, ReadError> {
        self.queries.lock().unwrap().push(sql.to_string());
        if let Some(message) = &self.failing {
            return Err(ReadError::Query(message.clone()));
        }
        Ok(self.answers.get(sql).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), ReadError> {
        Ok(())
    }
}
