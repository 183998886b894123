//! Media extraction engine boundary
//!
//! The pipeline never talks to yt-dlp directly. It goes through the
//! [`MediaEngine`] trait, which exposes exactly two operations:
//!
//! - resolve metadata for a target without downloading media
//! - fetch a target and transcode it into the requested output template
//!
//! ## Implementations
//!
//! - [`CliMediaEngine`]: drives an external `yt-dlp` binary
//! - [`NoOpMediaEngine`]: stub used when yt-dlp is unavailable
//!
//! ## Usage
//!
//! ```no_run
//! use yt_fetch::engine::{CliMediaEngine, MediaEngine};
//! use yt_fetch::types::Target;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = CliMediaEngine::from_path()
//!         .expect("yt-dlp binary not found");
//!
//!     let target = Target::Search {
//!         query: "lofi beats".into(),
//!         prefix: "ytsearch1:".into(),
//!     };
//!     let info = engine.resolve_metadata(&target).await?;
//!     println!("First result: {}", info.title);
//!
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod parser;
mod traits;

pub use cli::CliMediaEngine;
pub use noop::NoOpMediaEngine;
pub use parser::parse_metadata;
pub use traits::{EngineCapabilities, MediaEngine};

use crate::config::ToolsConfig;
use std::sync::Arc;

/// Pick the engine implementation for the given tool settings
///
/// An explicit `ytdlp_path` wins; otherwise PATH is searched when allowed.
/// Falls back to [`NoOpMediaEngine`] so the server can still start and
/// report that downloads are unavailable.
pub fn engine_from_config(tools: &ToolsConfig) -> Arc<dyn MediaEngine> {
    let engine = match &tools.ytdlp_path {
        Some(path) => Some(CliMediaEngine::new(path.clone())),
        None if tools.search_path => CliMediaEngine::from_path(),
        None => None,
    };

    match engine {
        Some(engine) => {
            let engine = match &tools.ffmpeg_location {
                Some(location) => engine.with_ffmpeg_location(location.clone()),
                None => engine,
            };
            tracing::info!(binary = %engine.binary_path().display(), "Using yt-dlp engine");
            Arc::new(engine)
        }
        None => {
            tracing::warn!("yt-dlp not found, downloads are disabled");
            Arc::new(NoOpMediaEngine)
        }
    }
}
