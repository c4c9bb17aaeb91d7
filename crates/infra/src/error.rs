//! Store error model.

use storefront_core::DomainError;
use thiserror::Error;

/// Result type used across the persistence layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence-layer error: either a domain failure surfaced through a store
/// operation, or a database failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row came back in a shape the mappers cannot interpret (e.g. an
    /// unknown discriminator value).
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// Map a unique-constraint violation (PostgreSQL error code 23505) to a
/// domain conflict; everything else stays a database error.
pub(crate) fn conflict_on_unique(err: sqlx::Error, msg: &str) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::Domain(DomainError::conflict(msg));
        }
    }
    StoreError::Database(err)
}
