//! # yt-fetch CLI
//!
//! ```bash
//! # Serve the form on the configured address (default 127.0.0.1:8501)
//! yt-fetch serve --config ./yt-fetch.toml
//!
//! # Fetch once from the terminal
//! yt-fetch fetch "lofi hip hop" --output ~/Music
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `yt_fetch=info,tower_http=info`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use yt_fetch::{CallerAddress, Config, FetchPipeline};

/// Turn a video link or search phrase into an MP3.
#[derive(Parser)]
#[command(name = "yt-fetch", version, about)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web form.
    Serve {
        /// Address to listen on, overriding `server.api.bind_address`.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Run one fetch and write `<title>.mp3` into a directory.
    Fetch {
        /// YouTube link or search phrase.
        query: String,

        /// Where to write the file.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
}

/// Ledger caller recorded for terminal fetches
const LOCAL_CALLER: &str = "local";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("yt_fetch=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.api.bind_address = bind;
            }
            config.validate().context("invalid configuration")?;

            let config = Arc::new(config);
            let pipeline = Arc::new(FetchPipeline::from_config(config.clone()).await?);

            tracing::info!(
                url = %format!("http://{}/", config.server.api.bind_address),
                "Form available"
            );
            yt_fetch::run_with_shutdown(pipeline, config).await?;
        }
        Commands::Fetch { query, output } => {
            config.validate().context("invalid configuration")?;

            let pipeline = FetchPipeline::from_config(Arc::new(config)).await?;
            let artifact = pipeline
                .fetch(&query, &CallerAddress(LOCAL_CALLER.to_string()))
                .await?;

            tokio::fs::create_dir_all(&output)
                .await
                .with_context(|| format!("creating {}", output.display()))?;
            let path = output.join(&artifact.file_name);
            tokio::fs::write(&path, &artifact.bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;

            println!("{}", path.display());
        }
    }

    Ok(())
}
