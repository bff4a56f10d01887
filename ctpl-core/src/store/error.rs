//! Error types for the data store.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from libSQL.
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data in the store.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The query named a column that is not a plain identifier.
    #[error("invalid column name: {0}")]
    InvalidColumn(String),
}
