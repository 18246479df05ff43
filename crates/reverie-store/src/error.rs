//! Error types for the record store.

use thiserror::Error;

/// Errors that can occur in the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or operation failed.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// A unique constraint was violated (duplicate username or name).
    #[error("Uniqueness violation: {0}")]
    Uniqueness(String),

    /// Requested record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data could not be interpreted.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        // Constraint violations get their own variant so callers can reject
        // the write without string matching.
        if let rusqlite::Error::SqliteFailure(e, msg) = &err
            && e.code == rusqlite::ErrorCode::ConstraintViolation
        {
            return StoreError::Uniqueness(
                msg.clone().unwrap_or_else(|| "constraint violation".to_string()),
            );
        }
        StoreError::Database(err)
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
