use serde::Deserialize;

/// Configuration options specific to the Catalog service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path or URL of the SQLite database.
    pub database_url: String,
    /// Interface the HTTP server binds to.
    pub address: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Populate an empty catalog with sample data on start-up.
    #[serde(default)]
    pub seed_sample_data: bool,
}
