//! Configuration types for yt-fetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf};

/// Audio conversion settings handed to the extraction engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Stream selector (default: "bestaudio/best")
    #[serde(default = "default_format_selector")]
    pub format_selector: String,

    /// Target codec, also the artifact extension (default: "mp3")
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Target bitrate in kbit/s (default: "192")
    #[serde(default = "default_quality")]
    pub quality: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            format_selector: default_format_selector(),
            codec: default_codec(),
            quality: default_quality(),
        }
    }
}

impl AudioSettings {
    /// Artifact extension including the leading dot
    pub fn extension(&self) -> String {
        format!(".{}", self.codec)
    }

    /// MIME type offered with the artifact
    pub fn content_type(&self) -> &'static str {
        match self.codec.as_str() {
            "mp3" => "audio/mpeg",
            "m4a" | "aac" => "audio/mp4",
            "opus" => "audio/opus",
            "vorbis" | "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            "wav" => "audio/wav",
            _ => "application/octet-stream",
        }
    }
}

/// How job tokens are derived
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStrategy {
    /// Unix seconds only; two requests in the same second share a token
    #[default]
    Timestamp,
    /// Unix seconds plus a random suffix
    Unique,
}

/// Download behavior configuration (directory, audio conversion, classification)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Shared output directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Audio conversion settings
    #[serde(default)]
    pub audio: AudioSettings,

    /// Restrict to a single item even if the target is a playlist (default: true)
    #[serde(default = "default_true")]
    pub single_item: bool,

    /// Substrings that mark a query as a direct video reference
    #[serde(default = "default_direct_markers")]
    pub direct_markers: Vec<String>,

    /// Prefix that turns a free-text query into a first-search-result target
    #[serde(default = "default_search_prefix")]
    pub search_prefix: String,

    /// Job token derivation
    #[serde(default)]
    pub token_strategy: TokenStrategy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            audio: AudioSettings::default(),
            single_item: true,
            direct_markers: default_direct_markers(),
            search_prefix: default_search_prefix(),
            token_strategy: TokenStrategy::default(),
        }
    }
}

/// External tool paths
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Directory or path of ffmpeg, forwarded to yt-dlp (auto-detected by yt-dlp if None)
    #[serde(default)]
    pub ffmpeg_location: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_location: None,
            search_path: true,
        }
    }
}

/// Request ledger configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Append one CSV row per request (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ledger file path (default: "./downloads/log.csv")
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_ledger_path(),
        }
    }
}

/// Main configuration for yt-fetch
///
/// Every field has a default, so an empty TOML file (or no file at all)
/// produces a working configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Request ledger settings
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Shared output directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot enforce on its own
    pub fn validate(&self) -> Result<()> {
        if self.download.audio.codec.trim().is_empty() {
            return Err(config_error("codec must not be empty", "download.audio.codec"));
        }
        if self
            .download
            .audio
            .codec
            .contains(|c: char| c == '/' || c == '\\' || c == '.')
        {
            return Err(config_error(
                "codec must be a bare extension such as \"mp3\"",
                "download.audio.codec",
            ));
        }
        if self.download.direct_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(config_error(
                "at least one direct marker is required",
                "download.direct_markers",
            ));
        }
        if self.download.search_prefix.trim().is_empty() {
            return Err(config_error(
                "search prefix must not be empty",
                "download.search_prefix",
            ));
        }

        let rate_limit = &self.server.api.rate_limit;
        if rate_limit.enabled && (rate_limit.requests_per_second == 0 || rate_limit.burst_size == 0)
        {
            return Err(config_error(
                "rate limit values must be greater than zero",
                "server.api.rate_limit",
            ));
        }

        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// HTTP API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8501)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate limiting configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Requests per second per IP (default: 1)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Burst size (default: 5)
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// Endpoints exempt from rate limiting
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,

    /// IPs exempt from rate limiting (e.g., localhost)
    #[serde(default = "default_exempt_ips")]
    pub exempt_ips: Vec<std::net::IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
            exempt_paths: default_exempt_paths(),
            exempt_ips: default_exempt_ips(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("./downloads/log.csv")
}

fn default_format_selector() -> String {
    "bestaudio/best".into()
}

fn default_codec() -> String {
    "mp3".into()
}

fn default_quality() -> String {
    "192".into()
}

fn default_direct_markers() -> Vec<String> {
    vec!["youtube.com".into(), "youtu.be".into()]
}

fn default_search_prefix() -> String {
    "ytsearch1:".into()
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8501))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_requests_per_second() -> u32 {
    1
}

fn default_burst_size() -> u32 {
    5
}

fn default_exempt_paths() -> Vec<String> {
    vec!["/health".into(), "/events".into()]
}

fn default_exempt_ips() -> Vec<std::net::IpAddr> {
    vec![
        std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        std::net::IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
    ]
}
