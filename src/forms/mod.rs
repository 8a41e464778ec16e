//! Request bodies and query strings accepted by the HTTP API.
//!
//! Forms are plain deserializable structs validated with `validator`; each
//! converts into the matching domain type through `TryFrom`.

use serde::Deserialize;

pub mod categories;
pub mod products;

/// Query string of the `search` endpoints. A missing name matches everything.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

/// Blank optional text is treated as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
