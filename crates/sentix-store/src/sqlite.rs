use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::StoreError;

/// SQLite-backed store for the watchlist, articles and sentiment scores.
///
/// `rusqlite::Connection` is not `Sync`, so access is serialized through a
/// `Mutex`. Every write the pipeline depends on is a single statement, which
/// keeps `insert_if_absent` atomic even when several symbols are refreshed
/// concurrently.
pub struct SentimentStore {
    conn: Mutex<Connection>,
}

impl SentimentStore {
    /// Open a read-write connection to the database file.
    /// Creates the schema if it doesn't exist. Enables WAL mode.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open an in-memory database. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(sentix_models::schema::SENTIMENT_DDL)?;
        tracing::debug!("Sentiment store schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("SQLite mutex poisoned: {e}")))
    }
}

/// Wrap a parse failure on a stored column so it can be returned from a row mapper.
pub(crate) fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::<dyn std::error::Error + Send + Sync>::from(message),
    )
}
