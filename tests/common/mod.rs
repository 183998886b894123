//! Common test utilities for yt-fetch integration tests
//!
//! The fake yt-dlp written here understands just enough of the real
//! command line to drive the whole pipeline without network access:
//! `--dump-single-json` prints metadata, anything else writes an MP3-ish
//! file to the `-o` template. Everything after `--` is the target. Every
//! invocation is appended to `calls.log`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use yt_fetch::{CliMediaEngine, Config, CsvLedger, FetchPipeline};

/// Bytes the fake engine writes as the converted audio
pub const FAKE_AUDIO: &[u8] = b"ID3fake";

/// A temp workspace holding the fake engine, the download dir and the ledger
pub struct Workspace {
    pub dir: TempDir,
    pub engine_path: PathBuf,
}

impl Workspace {
    pub fn download_dir(&self) -> PathBuf {
        self.dir.path().join("downloads")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.download_dir().join("log.csv")
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.download.download_dir = self.download_dir();
        config.ledger.path = self.ledger_path();
        config.tools.ytdlp_path = Some(self.engine_path.clone());
        config.tools.search_path = false;
        config
    }

    /// Pipeline over the fake engine and a CSV ledger
    pub async fn pipeline(&self) -> FetchPipeline {
        self.pipeline_with(self.config()).await
    }

    pub async fn pipeline_with(&self, config: Config) -> FetchPipeline {
        FetchPipeline::new(
            Arc::new(config),
            Arc::new(CliMediaEngine::new(self.engine_path.clone())),
            Arc::new(CsvLedger::new(self.ledger_path())),
        )
        .await
        .unwrap()
    }

    /// Argument lines the fake engine has been called with
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Files currently in the download directory, sorted
    pub fn downloads(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.download_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn ledger_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.ledger_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Create a workspace whose fake engine resolves every target to `title`
///
/// `title` must not contain `/`, `&` or `'`.
pub fn workspace(title: &str) -> Workspace {
    workspace_with_delay(title, 0)
}

/// Like [`workspace`], but downloads sleep for `delay_secs` first
pub fn workspace_with_delay(title: &str, delay_secs: u32) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let engine_path = dir.path().join("yt-dlp");
    write_fake_engine(&engine_path, dir.path(), title, delay_secs);
    Workspace { dir, engine_path }
}

/// Create a workspace whose fake engine always fails with `stderr`
pub fn failing_workspace(stderr: &str) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let engine_path = dir.path().join("yt-dlp");
    let script = format!("#!/bin/sh\necho '{stderr}' >&2\nexit 1\n");
    install_script(&engine_path, &script);
    Workspace { dir, engine_path }
}

fn write_fake_engine(path: &Path, log_dir: &Path, title: &str, delay_secs: u32) {
    let log = log_dir.join("calls.log");
    let script = format!(
        r#"#!/bin/sh
printf '%s\n' "$*" >> '{log}'
out=""
target=""
dump=0
while [ $# -gt 0 ]; do
  case "$1" in
    --dump-single-json) dump=1 ;;
    -o) shift; out="$1" ;;
    -f|--audio-format|--audio-quality|--playlist-items|--ffmpeg-location) shift ;;
    --) shift; target="$1"; break ;;
    -*) ;;
    *) target="$1" ;;
  esac
  shift
done
if [ "$dump" = 1 ]; then
  case "$target" in
    ytsearch*) printf '{{"_type":"playlist","entries":[{{"id":"abc123","title":"%s"}}]}}\n' '{title}' ;;
    *) printf '{{"id":"abc123","title":"%s","duration":212}}\n' '{title}' ;;
  esac
  exit 0
fi
sleep {delay_secs}
file=$(printf '%s' "$out" | sed -e 's/%(title)s/{title}/' -e 's/%(ext)s/mp3/')
printf 'ID3fake' > "$file"
"#,
        log = log.display(),
    );
    install_script(path, &script);
}

fn install_script(path: &Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, script).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
