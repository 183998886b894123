//! Error types for yt-fetch
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (engine failures, missing artifacts, user input)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes
//! - Context information (job token, directory, engine command, etc.)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for yt-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for yt-fetch
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// The submitted query was empty or whitespace only
    #[error("please enter a link or search term")]
    EmptyQuery,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download.audio.codec")
        key: Option<String>,
    },

    /// The extraction engine ran but reported a failure
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The engine reported success but no matching file exists in the output directory
    #[error("file was not found after processing (job {token} in {dir})")]
    ArtifactNotFound {
        /// Job token whose artifact was expected
        token: String,
        /// Directory that was scanned
        dir: PathBuf,
    },

    /// Ledger append failed
    #[error("ledger error: {0}")]
    Ledger(String),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// External tool execution failed (yt-dlp could not be started)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors reported by the media extraction engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process exited unsuccessfully
    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        /// Which engine operation was running (e.g., "metadata", "download")
        command: String,
        /// Exit status as reported by the OS
        status: String,
        /// Trimmed standard error output
        stderr: String,
    },

    /// The engine produced output that could not be interpreted
    #[error("unreadable engine output: {0}")]
    InvalidOutput(String),

    /// A search or collection resolved to zero items
    #[error("no results for {target}")]
    NoEntries {
        /// The target that was resolved
        target: String,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
/// It follows a standard format with machine-readable error codes,
/// human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "artifact_not_found",
///     "message": "file was not found after processing (job 1718000000 in downloads)",
///     "details": {
///       "token": "1718000000"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "empty_query", "engine_error")
    pub code: String,

    /// Human-readable error message, suitable for the status line
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::EmptyQuery => 400,
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::ArtifactNotFound { .. } => 404,

            // 500 Internal Server Error - Server-side issues
            Error::Ledger(_) => 500,
            Error::Csv(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - the engine or the video host failed
            Error::Engine(_) => 502,

            // 503 Service Unavailable
            Error::ExternalTool(_) => 503,

            // 501 Not Implemented - Feature not supported
            Error::NotSupported(_) => 501,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::EmptyQuery => "empty_query",
            Error::Config { .. } => "config_error",
            Error::Engine(e) => match e {
                EngineError::CommandFailed { .. } => "engine_error",
                EngineError::InvalidOutput(_) => "engine_output_invalid",
                EngineError::NoEntries { .. } => "no_results",
            },
            Error::ArtifactNotFound { .. } => "artifact_not_found",
            Error::Ledger(_) => "ledger_error",
            Error::Csv(_) => "ledger_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::ArtifactNotFound { token, dir } => Some(serde_json::json!({
                "token": token,
                "dir": dir,
            })),
            Error::Engine(EngineError::CommandFailed {
                command, status, ..
            }) => Some(serde_json::json!({
                "command": command,
                "status": status,
            })),
            Error::Engine(EngineError::NoEntries { target }) => Some(serde_json::json!({
                "target": target,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
