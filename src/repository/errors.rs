use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Errors raised by catalog stores.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    ConnectionError(#[from] PoolError),
    /// Any database failure without a more specific variant.
    #[error("database error: {0}")]
    DatabaseError(DieselError),
    /// A write would leave a dangling reference or delete a referenced row.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),
    /// A write collided with a unique constraint.
    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),
    /// Stored or supplied data failed a value constraint.
    #[error("validation error: {0}")]
    ValidationError(String),
    /// No identifier is left above the highest one in use.
    #[error("{0} sequence exhausted")]
    SequenceExhausted(&'static str),
    /// The in-memory store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ReferentialIntegrity(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                Self::ValidationError(info.message().to_string())
            }
            other => Self::DatabaseError(other),
        }
    }
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
