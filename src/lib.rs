//! # yt-fetch
//!
//! A single-page web form that turns a YouTube link or a free-text search
//! phrase into a downloadable MP3.
//!
//! The heavy lifting is delegated to an external media engine (`yt-dlp`,
//! which in turn drives `ffmpeg`). This crate classifies the input, asks the
//! engine for metadata and the audio file, appends a row to a request
//! ledger, hands the file back, and deletes it from disk.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use yt_fetch::{CallerAddress, Config, FetchPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let pipeline = FetchPipeline::from_config(config).await?;
//!
//!     let artifact = pipeline
//!         .fetch("https://youtu.be/dQw4w9WgXcQ", &CallerAddress::unknown())
//!         .await?;
//!     std::fs::write(&artifact.file_name, &artifact.bytes)?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP boundary: form page, fetch endpoint, system endpoints
pub mod api;
/// Configuration types
pub mod config;
/// Media extraction engine boundary
pub mod engine;
/// Error types
pub mod error;
/// Append-only request ledger
pub mod ledger;
/// The request-to-artifact pipeline
pub mod pipeline;
/// Core types
pub mod types;
/// Download name and header helpers
pub mod utils;

pub use config::{Config, DownloadConfig, LedgerConfig, TokenStrategy, ToolsConfig};
pub use engine::{CliMediaEngine, MediaEngine, NoOpMediaEngine};
pub use error::{ApiError, EngineError, Error, Result, ToHttpStatus};
pub use ledger::{CsvLedger, LedgerSink, NoOpLedger};
pub use pipeline::FetchPipeline;
pub use types::{Artifact, CallerAddress, Event, JobToken, LedgerRecord, MediaInfo, Target};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Serve the form until SIGTERM or SIGINT (Ctrl+C) arrives
///
/// In-flight fetches are allowed to finish before this returns.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use yt_fetch::{Config, FetchPipeline, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::default());
///     let pipeline = Arc::new(FetchPipeline::from_config(config.clone()).await?);
///
///     run_with_shutdown(pipeline, config).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(pipeline: Arc<FetchPipeline>, config: Arc<Config>) -> Result<()> {
    let shutdown = CancellationToken::new();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
    });

    api::start_api_server_with_shutdown(pipeline, config, shutdown).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => tracing::info!("Received SIGINT signal (Ctrl+C)"),
                    Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
                },
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for Ctrl+C only");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
