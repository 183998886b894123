//! CSV file ledger

use super::LedgerSink;
use crate::types::LedgerRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Header row written to a fresh ledger file
pub const LEDGER_HEADER: [&str; 4] = ["timestamp", "title", "target", "caller"];

/// Append-only CSV ledger
///
/// The file (and its parent directory) is created on first append, with the
/// header row, if it is absent or empty. Appends are serialized so rows from
/// concurrent requests never interleave, and timestamps never go backwards:
/// a record stamped before the previous row is written with the previous
/// row's timestamp.
pub struct CsvLedger {
    path: PathBuf,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
}

impl CsvLedger {
    /// Create a ledger writing to `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_timestamp: Mutex::new(None),
        }
    }

    /// Ledger file location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn append_row(path: &Path, record: &LedgerRecord) -> crate::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(LEDGER_HEADER)?;
    }
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}

#[async_trait]
impl LedgerSink for CsvLedger {
    async fn append(&self, record: &LedgerRecord) -> crate::Result<()> {
        let mut last = self.last_timestamp.lock().await;

        let mut record = record.clone();
        if let Some(previous) = *last
            && record.timestamp < previous
        {
            tracing::debug!(
                requested = %record.timestamp,
                recorded = %previous,
                title = %record.title,
                "Ledger timestamp raised to keep rows in order"
            );
            record.timestamp = previous;
        }

        let path = self.path.clone();
        let row = record.clone();
        tokio::task::spawn_blocking(move || append_row(&path, &row))
            .await
            .map_err(|e| crate::Error::Ledger(format!("ledger writer panicked: {e}")))??;

        *last = Some(record.timestamp);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(secs: i64, title: &str) -> LedgerRecord {
        LedgerRecord {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            title: title.into(),
            target: format!("ytsearch1:{title}"),
            caller: "203.0.113.7".into(),
        }
    }

    fn read_rows(path: &Path) -> (Vec<String>, Vec<LedgerRecord>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader.deserialize().map(|r| r.unwrap()).collect();
        (header, rows)
    }

    #[tokio::test]
    async fn first_append_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("log.csv");
        let ledger = CsvLedger::new(path.clone());

        ledger.append(&record(1_700_000_000, "Song")).await.unwrap();

        let (header, rows) = read_rows(&path);
        assert_eq!(header, LEDGER_HEADER);
        assert_eq!(rows, vec![record(1_700_000_000, "Song")]);
    }

    #[tokio::test]
    async fn header_is_written_once_across_ledger_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");

        CsvLedger::new(path.clone())
            .append(&record(1, "a"))
            .await
            .unwrap();
        CsvLedger::new(path.clone())
            .append(&record(2, "b"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("timestamp,title,target,caller").count(), 1);

        let (_, rows) = read_rows(&path);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn titles_with_commas_and_quotes_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        let ledger = CsvLedger::new(path.clone());

        let tricky = record(5, "Live, \"Unplugged\"\nPart 2");
        ledger.append(&tricky).await.unwrap();

        let (_, rows) = read_rows(&path);
        assert_eq!(rows, vec![tricky]);
    }

    #[tokio::test]
    async fn timestamps_never_go_backwards() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        let ledger = CsvLedger::new(path.clone());

        ledger.append(&record(200, "late")).await.unwrap();
        ledger.append(&record(100, "early")).await.unwrap();

        let (_, rows) = read_rows(&path);
        assert_eq!(rows[0].timestamp, rows[1].timestamp);
        assert_eq!(rows[1].title, "early");
    }

    #[tokio::test]
    async fn only_backwards_timestamps_are_adjusted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        let ledger = CsvLedger::new(path.clone());

        let first = record(100, "first");
        let second = record(300, "second");
        let third = record(200, "third");
        ledger.append(&first).await.unwrap();
        ledger.append(&second).await.unwrap();
        ledger.append(&third).await.unwrap();

        let (_, rows) = read_rows(&path);
        assert_eq!(rows[0], first);
        assert_eq!(rows[1], second);
        assert_eq!(rows[2].timestamp, second.timestamp);
        assert_eq!(rows[2].title, "third");
    }

    #[tokio::test]
    async fn concurrent_appends_produce_whole_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        let ledger = Arc::new(CsvLedger::new(path.clone()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.append(&record(1_000 + i, &format!("song {i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let (_, rows) = read_rows(&path);
        assert_eq!(rows.len(), 16);
        assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be
        let ledger = CsvLedger::new(dir.path().to_path_buf());

        assert!(ledger.append(&record(1, "x")).await.is_err());
    }
}
