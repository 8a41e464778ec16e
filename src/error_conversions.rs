//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service or repository error types, so
//! the conversions live here instead of next to the error definitions.

use crate::domain::types::TypeConstraintError;
use crate::repository::RepositoryError;
use crate::services::ServiceError;

#[cfg(feature = "server")]
use crate::forms::categories::CategoryFormError;
#[cfg(feature = "server")]
use crate::forms::products::{ProductFormError, StockUpdateError};

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::ReferentialIntegrity(message) => ServiceError::Integrity(message),
            RepositoryError::UniqueViolation(message) => ServiceError::Conflict(message),
            RepositoryError::ValidationError(message) => ServiceError::TypeConstraint(message),
            RepositoryError::ConnectionError(_)
            | RepositoryError::DatabaseError(_)
            | RepositoryError::SequenceExhausted(_)
            | RepositoryError::LockPoisoned => ServiceError::Internal,
        }
    }
}

#[cfg(feature = "server")]
impl From<CategoryFormError> for ServiceError {
    fn from(val: CategoryFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

#[cfg(feature = "server")]
impl From<ProductFormError> for ServiceError {
    fn from(val: ProductFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

#[cfg(feature = "server")]
impl From<StockUpdateError> for ServiceError {
    fn from(val: StockUpdateError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
