use crate::error::{WriteError, WriteErrorKind};
use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, error::SqlState};

/// Maps a driver error onto the kinds the batch upserter acts on.
pub fn classify_pg_error(err: &PgError) -> WriteError {
    if let Some(db) = err.as_db_error() {
        return WriteError::new(kind_for_code(db.code()), db.message());
    }

    if err.is_closed() {
        return WriteError::new(WriteErrorKind::Connection, err.to_string());
    }

    let message = err.to_string();
    WriteError::new(WriteErrorKind::from_message(&message), message)
}

pub fn classify_pool_error(err: &PoolError) -> WriteError {
    match err {
        PoolError::Backend(pg) => {
            let mut classified = classify_pg_error(pg);
            if classified.kind == WriteErrorKind::Other {
                classified.kind = WriteErrorKind::Connection;
            }
            classified
        }
        other => WriteError::new(WriteErrorKind::Connection, other.to_string()),
    }
}

fn kind_for_code(code: &SqlState) -> WriteErrorKind {
    match *code {
        SqlState::UNIQUE_VIOLATION => WriteErrorKind::UniqueViolation,
        // ON CONFLICT DO UPDATE command cannot affect row a second time
        SqlState::CARDINALITY_VIOLATION => WriteErrorKind::ConflictCardinality,
        SqlState::TOO_MANY_CONNECTIONS
        | SqlState::ADMIN_SHUTDOWN
        | SqlState::CRASH_SHUTDOWN
        | SqlState::CANNOT_CONNECT_NOW
        | SqlState::CONNECTION_FAILURE
        | SqlState::CONNECTION_DOES_NOT_EXIST
        | SqlState::CONNECTION_EXCEPTION
        | SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION
        | SqlState::SQLSERVER_REJECTED_ESTABLISHMENT_OF_SQLCONNECTION => {
            WriteErrorKind::Connection
        }
        _ => WriteErrorKind::Other,
    }
}
