//! Shared test helpers: a scripted engine, a recording ledger and pipeline builders.

use crate::config::Config;
use crate::engine::{EngineCapabilities, MediaEngine};
use crate::error::EngineError;
use crate::ledger::LedgerSink;
use crate::pipeline::FetchPipeline;
use crate::types::{LedgerRecord, MediaInfo, OutputSpec, Target};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Engine that resolves a fixed title and writes a small fake artifact
pub(crate) struct StubEngine {
    title: String,
    extension: String,
    write_artifact: bool,
    metadata_error: Option<String>,
    download_error: Option<String>,
    download_delay: Duration,
    targets: Mutex<Vec<String>>,
    pub(crate) metadata_calls: AtomicUsize,
    pub(crate) download_calls: AtomicUsize,
}

impl StubEngine {
    /// Bytes written into every artifact
    pub(crate) const AUDIO_BYTES: &'static [u8] = b"ID3\x04\x00fake-mp3-frames";

    pub(crate) fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            extension: ".mp3".to_string(),
            write_artifact: true,
            metadata_error: None,
            download_error: None,
            download_delay: Duration::ZERO,
            targets: Mutex::new(Vec::new()),
            metadata_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    /// Write the artifact with a different extension
    pub(crate) fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    /// Report success without writing anything
    pub(crate) fn without_artifact(mut self) -> Self {
        self.write_artifact = false;
        self
    }

    pub(crate) fn failing_metadata(mut self, stderr: &str) -> Self {
        self.metadata_error = Some(stderr.to_string());
        self
    }

    pub(crate) fn failing_download(mut self, stderr: &str) -> Self {
        self.download_error = Some(stderr.to_string());
        self
    }

    /// Sleep before writing the artifact, like a slow conversion
    pub(crate) fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = delay;
        self
    }

    /// Engine targets seen so far, in call order
    pub(crate) fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }

    fn failure(command: &str, stderr: &str) -> crate::Error {
        EngineError::CommandFailed {
            command: command.to_string(),
            status: "exit status: 1".to_string(),
            stderr: stderr.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl MediaEngine for StubEngine {
    async fn resolve_metadata(&self, target: &Target) -> crate::Result<MediaInfo> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target.as_engine_arg());

        if let Some(stderr) = &self.metadata_error {
            return Err(Self::failure("metadata", stderr));
        }

        Ok(MediaInfo {
            title: self.title.clone(),
            ..Default::default()
        })
    }

    async fn fetch_and_transcode(&self, target: &Target, output: &OutputSpec) -> crate::Result<()> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target.as_engine_arg());

        if let Some(stderr) = &self.download_error {
            return Err(Self::failure("download", stderr));
        }

        if !self.download_delay.is_zero() {
            tokio::time::sleep(self.download_delay).await;
        }

        if self.write_artifact {
            // yt-dlp replaces path separators in titles the same way
            let name = format!(
                "{}{}{}",
                output.token.file_prefix(),
                self.title.replace(['/', '\\'], "_"),
                self.extension
            );
            tokio::fs::write(output.dir.join(name), Self::AUDIO_BYTES).await?;
        }

        Ok(())
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_resolve: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Ledger that keeps records in memory, or always fails
#[derive(Default)]
pub(crate) struct RecordingLedger {
    records: Mutex<Vec<LedgerRecord>>,
    fail: bool,
}

impl RecordingLedger {
    pub(crate) fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn records(&self) -> Vec<LedgerRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerSink for RecordingLedger {
    async fn append(&self, record: &LedgerRecord) -> crate::Result<()> {
        if self.fail {
            return Err(crate::Error::Ledger("ledger is read-only".into()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Config writing into a fresh temp directory
pub(crate) fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.download_dir = dir.path().to_path_buf();
    config.ledger.path = dir.path().join("log.csv");
    config
}

/// Pipeline over `engine` with a recording ledger.
/// Returns the pipeline, the tempdir (which must be kept alive) and the ledger.
pub(crate) async fn create_test_pipeline(
    engine: Arc<dyn MediaEngine>,
) -> (FetchPipeline, TempDir, Arc<RecordingLedger>) {
    let ledger = Arc::new(RecordingLedger::default());
    let (pipeline, dir) = create_test_pipeline_with_ledger(engine, ledger.clone()).await;
    (pipeline, dir, ledger)
}

pub(crate) async fn create_test_pipeline_with_ledger(
    engine: Arc<dyn MediaEngine>,
    ledger: Arc<dyn LedgerSink>,
) -> (FetchPipeline, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(&dir));
    let pipeline = FetchPipeline::new(config, engine, ledger).await.unwrap();
    (pipeline, dir)
}
