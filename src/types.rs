//! Core types for yt-fetch

use crate::config::TokenStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// What the engine is asked to resolve
///
/// Classification is a plain substring test against the configured host
/// markers. Anything without a marker is treated as a search query, even if
/// it looks like a URL for some other site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// The query already identifies a video and is passed through unchanged
    Direct {
        /// The original query
        url: String,
    },
    /// Free text resolved to the first search result
    Search {
        /// The original query
        query: String,
        /// Engine prefix selecting the first result (e.g. "ytsearch1:")
        prefix: String,
    },
}

impl Target {
    /// Classify a raw query
    ///
    /// # Examples
    ///
    /// ```
    /// use yt_fetch::types::Target;
    ///
    /// let markers = vec!["youtube.com".to_string(), "youtu.be".to_string()];
    ///
    /// let direct = Target::classify("https://youtu.be/abc123", &markers, "ytsearch1:");
    /// assert_eq!(direct.as_engine_arg(), "https://youtu.be/abc123");
    ///
    /// let search = Target::classify("lofi beats", &markers, "ytsearch1:");
    /// assert_eq!(search.as_engine_arg(), "ytsearch1:lofi beats");
    /// ```
    pub fn classify(query: &str, markers: &[String], search_prefix: &str) -> Self {
        let is_direct = markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| query.contains(m.as_str()));

        if is_direct {
            Target::Direct {
                url: query.to_string(),
            }
        } else {
            Target::Search {
                query: query.to_string(),
                prefix: search_prefix.to_string(),
            }
        }
    }

    /// The identifier handed to the engine
    pub fn as_engine_arg(&self) -> String {
        match self {
            Target::Direct { url } => url.clone(),
            Target::Search { query, prefix } => format!("{prefix}{query}"),
        }
    }

    /// Whether this target came from a free-text query
    pub fn is_search(&self) -> bool {
        matches!(self, Target::Search { .. })
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_engine_arg())
    }
}

/// Per-request identifier namespacing output files in the shared directory
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobToken(pub String);

impl JobToken {
    /// Derive a token from the request start time
    ///
    /// With [`TokenStrategy::Timestamp`] two requests started within the same
    /// wall-clock second receive the same token.
    pub fn generate(strategy: TokenStrategy, now: DateTime<Utc>) -> Self {
        let secs = now.timestamp();
        match strategy {
            TokenStrategy::Timestamp => Self(secs.to_string()),
            TokenStrategy::Unique => Self(format!("{}-{:08x}", secs, rand::random::<u32>())),
        }
    }

    /// File name prefix shared by every file written for this job
    pub fn file_prefix(&self) -> String {
        format!("audio_{}_", self.0)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata resolved without downloading any media
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaInfo {
    /// Human-readable title
    pub title: String,

    /// Engine-side identifier of the item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Canonical page URL of the item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpage_url: Option<String>,
}

/// Where and how the engine writes its output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSpec {
    /// Shared output directory
    pub dir: PathBuf,
    /// Job token namespacing the output file
    pub token: JobToken,
    /// Stream selector
    pub format_selector: String,
    /// Target codec
    pub codec: String,
    /// Target bitrate in kbit/s
    pub quality: String,
    /// Refuse to expand playlists
    pub single_item: bool,
}

impl OutputSpec {
    /// Engine output template: `<dir>/audio_<token>_%(title)s.%(ext)s`
    pub fn template(&self) -> String {
        self.dir
            .join(format!("{}%(title)s.%(ext)s", self.token.file_prefix()))
            .to_string_lossy()
            .into_owned()
    }
}

/// The audio file delivered to the caller
#[derive(Clone, Debug)]
pub struct Artifact {
    /// Download name offered to the caller (`<title>.<codec>`)
    pub file_name: String,
    /// MIME type
    pub content_type: &'static str,
    /// Resolved title
    pub title: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Network address of the caller as reported by request headers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CallerAddress(pub String);

impl CallerAddress {
    /// Placeholder used when no address could be resolved
    pub const UNKNOWN: &'static str = "unknown";

    /// The placeholder address
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }
}

impl Default for CallerAddress {
    fn default() -> Self {
        Self::unknown()
    }
}

impl std::fmt::Display for CallerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the request ledger
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerRecord {
    /// When the request was logged
    pub timestamp: DateTime<Utc>,
    /// Resolved title
    pub title: String,
    /// Resolved engine target
    pub target: String,
    /// Caller address
    pub caller: String,
}

/// Event emitted while a fetch runs
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Free-text query is being looked up
    Searching {
        /// Job token
        token: JobToken,
        /// The original query
        query: String,
    },

    /// Metadata resolved
    Resolved {
        /// Job token
        token: JobToken,
        /// Resolved title
        title: String,
    },

    /// Engine is downloading and converting
    Downloading {
        /// Job token
        token: JobToken,
        /// The submitted query, after trimming
        query: String,
        /// Resolved title
        title: String,
    },

    /// Artifact read and ready for the caller
    Complete {
        /// Job token
        token: JobToken,
        /// Offered file name
        file_name: String,
        /// Size in bytes
        size_bytes: u64,
    },

    /// Fetch failed
    Failed {
        /// Job token
        token: JobToken,
        /// Error message
        error: String,
    },

    /// Graceful shutdown initiated
    Shutdown,
}

impl Event {
    /// SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Searching { .. } => "searching",
            Event::Resolved { .. } => "resolved",
            Event::Downloading { .. } => "downloading",
            Event::Complete { .. } => "complete",
            Event::Failed { .. } => "failed",
            Event::Shutdown => "shutdown",
        }
    }
}

/// System capabilities information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Extraction engine capabilities
    pub engine: EngineCapabilitiesInfo,

    /// Name of the ledger sink in use
    pub ledger: String,

    /// Target codec
    pub codec: String,
}

/// Information about the extraction engine
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EngineCapabilitiesInfo {
    /// Whether metadata can be resolved
    pub can_resolve: bool,

    /// Whether media can be downloaded and converted
    pub can_download: bool,

    /// Name of the engine implementation in use
    pub handler: String,
}
