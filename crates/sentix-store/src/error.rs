use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store not available: {0}")]
    Unavailable(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}
