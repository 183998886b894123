//! Request-to-artifact pipeline
//!
//! [`FetchPipeline`] turns one user string into one deliverable audio file:
//!
//! 1. reject empty input
//! 2. derive a job token from the wall-clock time
//! 3. classify the input as a direct reference or a first-result search
//! 4. resolve metadata (title) without downloading
//! 5. append a ledger record (failures are logged and ignored)
//! 6. download and convert into `<dir>/audio_<token>_<title>.<codec>`
//! 7. find the artifact by token prefix and extension
//! 8. read it into memory and delete it from disk
//!
//! Each invocation is all-or-nothing; nothing is retried and nothing is
//! cached between requests. The shared output directory is the only shared
//! state, and the job token prefix is the only thing keeping concurrent
//! requests apart.
//!
//! - [`fetch`] - the pipeline steps
//! - [`discovery`] - artifact lookup and delivery

mod discovery;
mod fetch;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use discovery::find_artifact;

use crate::config::Config;
use crate::engine::{MediaEngine, engine_from_config};
use crate::error::{Error, Result};
use crate::ledger::{LedgerSink, ledger_from_config};
use crate::types::{Capabilities, EngineCapabilitiesInfo, Event};
use std::sync::Arc;

/// Fetch pipeline (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct FetchPipeline {
    /// Configuration
    pub(crate) config: Arc<Config>,
    /// Extraction engine (trait object for pluggable implementations)
    pub(crate) engine: Arc<dyn MediaEngine>,
    /// Request ledger
    pub(crate) ledger: Arc<dyn LedgerSink>,
    /// Status event broadcast channel
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl FetchPipeline {
    /// Create a pipeline with an explicit engine and ledger
    ///
    /// Ensures the shared output directory exists.
    pub async fn new(
        config: Arc<Config>,
        engine: Arc<dyn MediaEngine>,
        ledger: Arc<dyn LedgerSink>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir().display(),
                        e
                    ),
                ))
            })?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(256);

        tracing::info!(
            dir = %config.download_dir().display(),
            engine = engine.name(),
            ledger = ledger.name(),
            "Fetch pipeline ready"
        );

        Ok(Self {
            config,
            engine,
            ledger,
            event_tx,
        })
    }

    /// Create a pipeline whose engine and ledger are chosen from the configuration
    pub async fn from_config(config: Arc<Config>) -> Result<Self> {
        let engine = engine_from_config(&config.tools);
        let ledger = ledger_from_config(&config.ledger);
        Self::new(config, engine, ledger).await
    }

    /// Subscribe to status events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Report what the configured engine and ledger can do
    pub fn capabilities(&self) -> Capabilities {
        let engine_caps = self.engine.capabilities();

        Capabilities {
            engine: EngineCapabilitiesInfo {
                can_resolve: engine_caps.can_resolve,
                can_download: engine_caps.can_download,
                handler: self.engine.name().to_string(),
            },
            ledger: self.ledger.name().to_string(),
            codec: self.config.download.audio.codec.clone(),
        }
    }

    /// Emit an event to all subscribers
    ///
    /// Dropped silently when nobody is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
