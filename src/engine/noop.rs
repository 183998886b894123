//! No-op engine for graceful degradation

use super::traits::{EngineCapabilities, MediaEngine};
use crate::types::{MediaInfo, OutputSpec, Target};
use async_trait::async_trait;

/// No-op engine used when yt-dlp is unavailable
///
/// Every operation returns `Error::NotSupported`, which lets the server start,
/// serve the form and report capabilities without a working engine.
///
/// # Examples
///
/// ```
/// use yt_fetch::engine::{MediaEngine, NoOpMediaEngine};
/// use yt_fetch::types::Target;
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = NoOpMediaEngine;
/// let target = Target::Direct { url: "https://youtu.be/abc123".into() };
/// assert!(engine.resolve_metadata(&target).await.is_err());
/// # }
/// ```
pub struct NoOpMediaEngine;

const UNAVAILABLE: &str = "downloads require the external yt-dlp binary. \
     Configure tools.ytdlp_path or ensure yt-dlp is in PATH.";

#[async_trait]
impl MediaEngine for NoOpMediaEngine {
    async fn resolve_metadata(&self, _target: &Target) -> crate::Result<MediaInfo> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    async fn fetch_and_transcode(
        &self,
        _target: &Target,
        _output: &OutputSpec,
    ) -> crate::Result<()> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_resolve: false,
            can_download: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
