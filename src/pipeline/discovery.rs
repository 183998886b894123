//! Artifact lookup and delivery

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Find the artifact written for a job
///
/// Scans `dir` for regular files whose name starts with `prefix` and ends with
/// `extension`. Candidates are ordered by name and the first one wins, so the
/// choice is stable when a token collision leaves more than one match.
pub async fn find_artifact(dir: &Path, prefix: &str, extension: &str) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut matches = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if name.starts_with(prefix)
            && name.ends_with(extension)
            && entry.file_type().await?.is_file()
        {
            matches.push(entry.path());
        }
    }

    matches.sort();
    if matches.len() > 1 {
        tracing::warn!(
            prefix,
            count = matches.len(),
            "Several artifacts share one job token, using the first"
        );
    }
    Ok(matches.into_iter().next())
}

/// Read an artifact fully into memory, then delete it
///
/// A failed delete is logged and does not fail delivery.
pub(crate) async fn take_artifact(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path).await?;

    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove delivered artifact");
    }

    Ok(bytes)
}
