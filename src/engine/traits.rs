//! Traits and types for the media extraction engine

use crate::types::{MediaInfo, OutputSpec, Target};
use async_trait::async_trait;

/// Capabilities of an engine implementation
#[derive(Debug, Clone, Copy)]
pub struct EngineCapabilities {
    /// Can resolve metadata without downloading
    pub can_resolve: bool,
    /// Can download and transcode media
    pub can_download: bool,
}

/// Trait for the opaque media extraction engine
///
/// Any implementation (external binary, native library, remote service)
/// satisfying this interface can back the fetch pipeline.
///
/// # Examples
///
/// ```no_run
/// use yt_fetch::engine::{CliMediaEngine, MediaEngine};
/// use yt_fetch::types::Target;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = CliMediaEngine::from_path()
///     .expect("yt-dlp binary not found");
///
/// let target = Target::Direct { url: "https://youtu.be/abc123".into() };
/// let info = engine.resolve_metadata(&target).await?;
/// println!("Title: {}", info.title);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Resolve metadata for a target without fetching any media
    ///
    /// A target that resolves to a collection (search results, playlist)
    /// reports the metadata of its first entry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine cannot be executed
    /// - The engine reports a failure (network, unavailable content)
    /// - The collection is empty
    async fn resolve_metadata(&self, target: &Target) -> crate::Result<MediaInfo>;

    /// Fetch a target and transcode it into the output described by `output`
    ///
    /// On success exactly one audio file is expected under `output.dir`
    /// whose name starts with the job token prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be executed or reports a failure.
    async fn fetch_and_transcode(&self, target: &Target, output: &OutputSpec) -> crate::Result<()>;

    /// Query capabilities of this engine
    fn capabilities(&self) -> EngineCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
