pub mod db;
pub mod directory;
pub mod outboxdb;
pub mod reviewdb;
pub mod verificationdb;
pub mod workerdb;

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the store traits. Each store is independently owned;
/// a failure from one never implies anything about the others.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("a pending verification request already exists for worker {0}")]
    DuplicatePending(Uuid),

    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Transient upstream failures, as opposed to logic errors. Propagation
    /// paths retry these; logic errors are surfaced immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(e) => !matches!(e, sqlx::Error::RowNotFound),
            StoreError::Unavailable(_) => true,
            StoreError::DuplicatePending(_) | StoreError::NotFound => false,
        }
    }
}
