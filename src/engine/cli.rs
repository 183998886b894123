//! CLI-based engine using the external yt-dlp binary

use super::parser::{parse_metadata, summarize_stderr};
use super::traits::{EngineCapabilities, MediaEngine};
use crate::error::EngineError;
use crate::types::{MediaInfo, OutputSpec, Target};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// CLI-based engine using the external yt-dlp binary
///
/// Metadata is resolved with `--dump-single-json --skip-download`; downloads
/// run yt-dlp with audio extraction so ffmpeg converts the best audio stream
/// into the configured codec and bitrate.
///
/// No timeout is applied: a stalled yt-dlp process blocks the request that
/// started it.
///
/// # Examples
///
/// ```no_run
/// use yt_fetch::engine::{CliMediaEngine, MediaEngine};
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let engine = CliMediaEngine::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let engine = CliMediaEngine::from_path()
///     .expect("yt-dlp not found in PATH");
/// assert_eq!(engine.name(), "cli-yt-dlp");
/// ```
pub struct CliMediaEngine {
    binary_path: PathBuf,
    ffmpeg_location: Option<PathBuf>,
}

impl CliMediaEngine {
    /// Create a new CLI engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            ffmpeg_location: None,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Forward an explicit ffmpeg location to yt-dlp
    pub fn with_ffmpeg_location(mut self, location: PathBuf) -> Self {
        self.ffmpeg_location = Some(location);
        self
    }

    /// Path of the yt-dlp binary this engine runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Arguments for a metadata-only lookup
    fn metadata_args(&self, target: &Target) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--dump-single-json".into(),
            "--skip-download".into(),
            "--no-playlist".into(),
            // Only the first entry of a collection is ever used
            "--playlist-items".into(),
            "1".into(),
            "--quiet".into(),
            "--no-warnings".into(),
        ];
        push_target(&mut args, target);
        args
    }

    /// Arguments for the download and audio conversion
    fn download_args(&self, target: &Target, output: &OutputSpec) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            output.format_selector.clone().into(),
            "-o".into(),
            output.template().into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            output.codec.clone().into(),
            "--audio-quality".into(),
            format!("{}K", output.quality).into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-progress".into(),
        ];

        if output.single_item {
            args.push("--no-playlist".into());
            // --no-playlist does not stop a bare playlist URL from expanding
            args.push("--playlist-items".into());
            args.push("1".into());
        }

        if let Some(location) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(location.clone().into_os_string());
        }

        push_target(&mut args, target);
        args
    }

    async fn run(&self, command: &str, args: Vec<OsString>) -> crate::Result<Vec<u8>> {
        tracing::debug!(
            binary = %self.binary_path.display(),
            command,
            "Running yt-dlp"
        );

        let output = Command::new(&self.binary_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: summarize_stderr(&output.stderr),
            }
            .into());
        }

        Ok(output.stdout)
    }
}

/// Append the target after `--` so a leading `-` is never read as an option
fn push_target(args: &mut Vec<OsString>, target: &Target) {
    args.push("--".into());
    args.push(target.as_engine_arg().into());
}

#[async_trait]
impl MediaEngine for CliMediaEngine {
    async fn resolve_metadata(&self, target: &Target) -> crate::Result<MediaInfo> {
        let stdout = self.run("metadata", self.metadata_args(target)).await?;
        parse_metadata(&stdout, &target.as_engine_arg())
    }

    async fn fetch_and_transcode(&self, target: &Target, output: &OutputSpec) -> crate::Result<()> {
        self.run("download", self.download_args(target, output))
            .await
            .map(|_| ())
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_resolve: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
