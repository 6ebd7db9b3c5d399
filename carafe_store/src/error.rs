use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
