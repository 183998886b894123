//! Parser for yt-dlp command output

use crate::error::EngineError;
use crate::types::MediaInfo;
use serde_json::Value;

/// Parse the JSON printed by `yt-dlp --dump-single-json`
///
/// Two shapes are accepted:
/// - a single item with a top-level `title`
/// - a collection (search results, playlist) whose `entries[0]` carries the title
///
/// # Arguments
///
/// * `stdout` - Standard output from the metadata command
/// * `target` - The engine target, used in the error for empty collections
pub fn parse_metadata(stdout: &[u8], target: &str) -> crate::Result<MediaInfo> {
    let json: Value = serde_json::from_slice(stdout)
        .map_err(|e| EngineError::InvalidOutput(format!("metadata is not JSON: {e}")))?;

    let item = match json.get("entries") {
        Some(Value::Array(entries)) => entries
            .iter()
            .find(|entry| !entry.is_null())
            .ok_or_else(|| EngineError::NoEntries {
                target: target.to_string(),
            })?,
        Some(Value::Null) | None => &json,
        Some(_) => {
            return Err(EngineError::InvalidOutput("entries is not a list".into()).into());
        }
    };

    let title = item
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::InvalidOutput("metadata has no title".into()))?;

    Ok(MediaInfo {
        title: title.to_string(),
        id: item.get("id").and_then(Value::as_str).map(str::to_string),
        duration: item.get("duration").and_then(Value::as_f64),
        webpage_url: item
            .get("webpage_url")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Reduce engine stderr to the lines worth showing a user
///
/// yt-dlp prefixes fatal messages with `ERROR:`. When none are present the
/// last non-empty line is used.
pub(crate) fn summarize_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);

    let errors: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    text.lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or("no output")
        .to_string()
}
