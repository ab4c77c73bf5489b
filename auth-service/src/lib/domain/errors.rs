use thiserror::Error;

/// Failure of a store-facing call.
///
/// Every variant is a transient dependency problem, never a statement about
/// the credential being checked.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store operation `{0}` exceeded its deadline")]
    DeadlineExceeded(&'static str),

    #[error("Store operation `{0}` was cancelled")]
    Cancelled(&'static str),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored record is corrupt: {0}")]
    CorruptRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
