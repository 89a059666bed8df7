//! ytdl-relay server binary

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use ytdl_relay::{Config, HistoryBackend, MediaRelay};

#[derive(Parser)]
#[command(name = "ytdl-relay")]
#[command(author, version, about = "Relay yt-dlp downloads to WebSocket clients", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides server.api.bind_address)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory for downloaded files (overrides download.download_dir)
    #[arg(short, long)]
    download_dir: Option<PathBuf>,

    /// Path to the yt-dlp binary (overrides tools.ytdlp_path)
    #[arg(long)]
    ytdlp: Option<PathBuf>,

    /// Keep history in memory instead of SQLite
    #[arg(long)]
    memory_history: bool,
}

impl Cli {
    fn into_config(self) -> ytdl_relay::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(bind) = self.bind {
            config.server.api.bind_address = bind;
        }
        if let Some(dir) = self.download_dir {
            config.download.download_dir = dir;
        }
        if let Some(path) = self.ytdlp {
            config.tools.ytdlp_path = Some(path);
        }
        if self.memory_history {
            config.persistence.backend = HistoryBackend::Memory;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ytdl_relay=info,tower_http=info")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    let relay = Arc::new(MediaRelay::new(config).await?);

    tracing::info!(
        address = %relay.config().server.api.bind_address,
        "ytdl-relay ready; sessions at /api/ws"
    );

    ytdl_relay::run_with_shutdown(relay).await?;
    Ok(())
}
