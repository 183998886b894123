//! The fetch operation itself

use super::FetchPipeline;
use super::discovery::{find_artifact, take_artifact};
use crate::error::{Error, Result};
use crate::types::{
    Artifact, CallerAddress, Event, JobToken, LedgerRecord, MediaInfo, OutputSpec, Target,
};
use crate::utils::download_file_name;
use chrono::Utc;

impl FetchPipeline {
    /// Turn a link or search phrase into an audio file
    ///
    /// `caller` is the address resolved by the hosting boundary; it only ends
    /// up in the ledger.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQuery`] if `query` is empty or whitespace; the engine is not invoked
    /// - engine errors from metadata resolution or download, passed through unchanged
    /// - [`Error::ArtifactNotFound`] if the download succeeded but no matching file exists
    ///
    /// Ledger failures never surface here.
    ///
    /// The work runs on its own task. Dropping the returned future abandons
    /// the result only; the engine call, discovery and deletion still finish.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use yt_fetch::{CallerAddress, Config, FetchPipeline};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pipeline = FetchPipeline::from_config(Arc::new(Config::default())).await?;
    /// let artifact = pipeline.fetch("lofi beats", &CallerAddress::unknown()).await?;
    /// std::fs::write(&artifact.file_name, &artifact.bytes)?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self, query: &str, caller: &CallerAddress) -> Result<Artifact> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let token = JobToken::generate(self.config.download.token_strategy, Utc::now());

        // The task outlives this future, so a dropped caller still gets its
        // artifact discovered and removed once the engine finishes
        let pipeline = self.clone();
        let query = query.to_string();
        let caller = caller.clone();
        tokio::spawn(async move { pipeline.fetch_with_token(&query, &caller, token).await })
            .await
            .map_err(|e| Error::Other(format!("fetch task failed: {e}")))?
    }

    /// Run the pipeline under a given job token
    pub(crate) async fn fetch_with_token(
        &self,
        query: &str,
        caller: &CallerAddress,
        token: JobToken,
    ) -> Result<Artifact> {
        match self.run(query, caller, &token).await {
            Ok(artifact) => {
                tracing::info!(
                    token = %token,
                    file_name = %artifact.file_name,
                    size_bytes = artifact.bytes.len(),
                    "Fetch complete"
                );
                self.emit_event(Event::Complete {
                    token,
                    file_name: artifact.file_name.clone(),
                    size_bytes: artifact.bytes.len() as u64,
                });
                Ok(artifact)
            }
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "Fetch failed");
                self.emit_event(Event::Failed {
                    token,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(&self, query: &str, caller: &CallerAddress, token: &JobToken) -> Result<Artifact> {
        let download = &self.config.download;

        let target = Target::classify(query, &download.direct_markers, &download.search_prefix);
        if target.is_search() {
            tracing::info!(token = %token, query, "Searching for first result");
            self.emit_event(Event::Searching {
                token: token.clone(),
                query: query.to_string(),
            });
        }

        let info = self.engine.resolve_metadata(&target).await?;
        tracing::info!(token = %token, title = %info.title, target = %target, "Resolved metadata");
        self.emit_event(Event::Resolved {
            token: token.clone(),
            title: info.title.clone(),
        });

        self.record(&info, &target, caller).await;

        let output = OutputSpec {
            dir: self.config.download_dir().clone(),
            token: token.clone(),
            format_selector: download.audio.format_selector.clone(),
            codec: download.audio.codec.clone(),
            quality: download.audio.quality.clone(),
            single_item: download.single_item,
        };

        self.emit_event(Event::Downloading {
            token: token.clone(),
            query: query.to_string(),
            title: info.title.clone(),
        });
        self.engine.fetch_and_transcode(&target, &output).await?;

        let extension = download.audio.extension();
        let path = find_artifact(&output.dir, &token.file_prefix(), &extension)
            .await?
            .ok_or_else(|| Error::ArtifactNotFound {
                token: token.to_string(),
                dir: output.dir.clone(),
            })?;

        let bytes = take_artifact(&path).await?;

        Ok(Artifact {
            file_name: download_file_name(&info.title, &extension),
            content_type: download.audio.content_type(),
            title: info.title,
            bytes,
        })
    }

    /// Append the ledger record for a resolved request
    async fn record(&self, info: &MediaInfo, target: &Target, caller: &CallerAddress) {
        let record = LedgerRecord {
            timestamp: Utc::now(),
            title: info.title.clone(),
            target: target.as_engine_arg(),
            caller: caller.to_string(),
        };

        if let Err(e) = self.ledger.append(&record).await {
            tracing::warn!(ledger = self.ledger.name(), error = %e, "Could not write ledger record");
        }
    }
}
