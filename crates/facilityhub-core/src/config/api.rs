//! REST collaborator configuration.

use serde::{Deserialize, Serialize};

/// Settings for the REST API collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Bearer token for authenticated requests. Held externally in
    /// production; configurable here for the headless console.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Page size used when draining paged room-list endpoints.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    20
}
