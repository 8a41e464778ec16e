use crate::repository::RepositoryError;

pub mod categories;
pub mod errors;
pub mod products;

pub use categories::{Categories, CategoryService};
pub use errors::{ServiceError, ServiceResult};
pub use products::{ProductService, Products};

/// Log a failed repository call and convert it into a [`ServiceError`].
///
/// Constraint violations are expected outcomes of caller input and are logged
/// as warnings; everything else is an error.
fn repository_error(action: &'static str) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |err| {
        match &err {
            RepositoryError::ReferentialIntegrity(_) | RepositoryError::UniqueViolation(_) => {
                log::warn!("Failed to {action}: {err}")
            }
            _ => log::error!("Failed to {action}: {err}"),
        }
        err.into()
    }
}
