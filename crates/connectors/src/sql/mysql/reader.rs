use crate::{
    error::{ConnectorError, ReadError},
    source::SourceReader,
    sql::redact_url,
};
use async_trait::async_trait;
use futures_util::{FutureExt, future::BoxFuture};
use model::records::row::SourceRow;
use mysql_async::{
    Conn, Error as MySqlError, Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts, Row,
    prelude::Queryable,
};
use std::{fmt, time::Duration};
use tracing::{debug, info};

use super::value::to_source_row;

/// Pooled reader for the legacy store, spoken to over the MySQL protocol.
#[derive(Clone)]
pub struct MySqlReader {
    pool: Pool,
    timeout: Duration,
    url: String,
}

impl MySqlReader {
    /// Builds the pool. Connections are opened lazily, so this must be
    /// called from within a Tokio runtime but does not touch the network.
    pub fn connect(url: &str, pool_size: usize, timeout: Duration) -> Result<Self, ConnectorError> {
        let opts = Opts::from_url(url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
        let constraints = PoolConstraints::new(1, pool_size.max(1))
            .ok_or_else(|| ConnectorError::Pool(format!("invalid pool size {pool_size}")))?;
        let opts = OptsBuilder::from_opts(opts)
            .pool_opts(PoolOpts::default().with_constraints(constraints));

        info!(url = %redact_url(url), pool_size, "Legacy source pool configured");
        Ok(MySqlReader {
            pool: Pool::new(opts),
            timeout,
            url: redact_url(url),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Waits for `acquire` to hand out a connection, runs `f` on it under
/// `timeout`, and drops the connection on every exit path. For a pooled
/// handle, dropping is what returns it to the pool.
///
/// Waiting for the connection and running `f` are bounded separately, each
/// by `timeout`. A slow checkout is a connection failure; a slow `f` is a
/// query timeout.
pub async fn with_connection<C, T, E, A, AE, F>(
    acquire: A,
    timeout: Duration,
    f: F,
) -> Result<T, ReadError>
where
    A: Future<Output = Result<C, AE>>,
    AE: fmt::Display,
    E: Into<ReadError>,
    F: for<'c> FnOnce(&'c mut C) -> BoxFuture<'c, Result<T, E>>,
{
    let mut conn = match tokio::time::timeout(timeout, acquire).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => return Err(ReadError::Connection(e.to_string())),
        Err(_) => {
            return Err(ReadError::Connection(format!(
                "no pooled connection became available within {}ms",
                timeout.as_millis()
            )));
        }
    };

    let outcome = tokio::time::timeout(timeout, f(&mut conn)).await;
    // Dropping the handle returns it to the pool, including after a timeout.
    drop(conn);

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(ReadError::Timeout(timeout)),
    }
}

impl From<MySqlError> for ReadError {
    fn from(err: MySqlError) -> Self {
        match err {
            MySqlError::Io(e) => ReadError::Connection(e.to_string()),
            MySqlError::Server(e) => ReadError::Query(format!("{} ({})", e.message, e.code)),
            other => ReadError::Query(other.to_string()),
        }
    }
}

#[async_trait]
impl SourceReader for MySqlReader {
    async fn query(&self, sql: &str) -> Result<Vec<SourceRow>, ReadError> {
        debug!(sql, "Running source query");
        let owned = sql.to_string();
        let rows = with_connection(self.pool.get_conn(), self.timeout, move |conn: &mut Conn| {
            async move { conn.query::<Row, _>(owned).await }.boxed()
        })
        .await?;
        debug!(rows = rows.len(), "Source query finished");
        Ok(rows.into_iter().map(to_source_row).collect())
    }

    async fn ping(&self) -> Result<(), ReadError> {
        with_connection(self.pool.get_conn(), self.timeout, |conn: &mut Conn| {
            conn.ping().boxed()
        })
        .await
    }

    async fn close(&self) {
        if let Err(e) = self.pool.clone().disconnect().await {
            debug!(error = %e, "Legacy source pool did not shut down cleanly");
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
