//! Route handlers for the REST API
//!
//! - [`fetch`]: the form page and the fetch endpoint
//! - [`system`]: health, capabilities, events, OpenAPI

use serde::{Deserialize, Serialize};

mod fetch;
mod system;

pub use fetch::*;
pub use system::*;

/// Request body for POST /fetch
///
/// Accepted as JSON or as an urlencoded form field.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FetchRequest {
    /// YouTube link or free-text search phrase
    #[serde(default)]
    pub query: String,
}

/// Response body for GET /health
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the server is up
    pub status: String,
    /// Crate version
    pub version: String,
}
