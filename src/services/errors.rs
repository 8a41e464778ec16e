use thiserror::Error;

/// Generic error type used by service layer functions.
///
/// Absence is never an error: lookups return `Ok(None)` and deletes of
/// unknown ids return `Ok(false)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// A write collided with an existing record.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A write would break a reference between categories and products.
    #[error("referential integrity violation: {0}")]
    Integrity(String),
    /// A value failed a domain type constraint.
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// A submitted form failed validation.
    #[error("{0}")]
    Form(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
