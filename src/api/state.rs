//! Application state for the API server

use crate::{Config, FetchPipeline};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The fetch pipeline
    pub pipeline: Arc<FetchPipeline>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(pipeline: Arc<FetchPipeline>, config: Arc<Config>) -> Self {
        Self { pipeline, config }
    }
}
