//! JSON shapes returned by the HTTP API.

use serde::Serialize;

pub mod categories;
pub mod products;

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDto {
    pub error: String,
}

impl ErrorDto {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
