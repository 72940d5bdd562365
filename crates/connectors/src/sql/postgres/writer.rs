use crate::{
    error::{ConnectorError, WriteError, WriteErrorKind},
    sql::{
        postgres::{
            error::{classify_pg_error, classify_pool_error},
            params::PgParamStore,
            pool::{PgPoolOptions, build_pool},
        },
        redact_url,
    },
    target::TargetWriter,
};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use planner::query::{ast::insert::Insert, dialect::Postgres, renderer::Renderer};
use tracing::trace;

/// Pooled writer for the PostgreSQL target schema.
#[derive(Clone)]
pub struct PgWriter {
    pool: Pool,
    url: String,
}

impl PgWriter {
    pub fn connect(url: &str, options: &PgPoolOptions) -> Result<Self, ConnectorError> {
        Ok(PgWriter {
            pool: build_pool(url, options)?,
            url: redact_url(url),
        })
    }

    pub fn from_pool(pool: Pool) -> Self {
        PgWriter {
            pool,
            url: "postgres".to_string(),
        }
    }
}

#[async_trait]
impl TargetWriter for PgWriter {
    async fn insert(&self, stmt: &Insert) -> Result<u64, WriteError> {
        let (sql, values) = Renderer::render_node(&Postgres, stmt);
        trace!(sql = %sql, params = values.len(), "Executing insert");

        let client = self.pool.get().await.map_err(|e| classify_pool_error(&e))?;
        let prepared = client
            .prepare(&sql)
            .await
            .map_err(|e| classify_pg_error(&e))?;
        let params = PgParamStore::coerce(values, prepared.params())
            .map_err(|e| WriteError::new(WriteErrorKind::Other, e))?;

        client
            .execute(&prepared, &params.as_refs())
            .await
            .map_err(|e| classify_pg_error(&e))
    }

    async fn ping(&self) -> Result<(), WriteError> {
        let client = self.pool.get().await.map_err(|e| classify_pool_error(&e))?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| classify_pg_error(&e))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close();
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
