//! # ytdl-relay
//!
//! A session-oriented relay in front of [yt-dlp](https://github.com/yt-dlp/yt-dlp).
//!
//! Clients connect over a WebSocket, send `download` or `clearHistory`
//! commands, and receive a stream of events: the video's metadata, progress
//! percentages, and finally a `complete` or `error` event. Completed downloads
//! are recorded in a history store (SQLite or in-memory) and the stored files
//! can be fetched back over HTTP.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ytdl_relay::{Config, MediaRelay, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.download.download_dir = "downloads".into();
//!
//!     let relay = Arc::new(MediaRelay::new(config).await?);
//!
//!     // Serve /api until SIGINT or SIGTERM
//!     run_with_shutdown(relay).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP and WebSocket server
pub mod api;
/// Format catalog
pub mod catalog;
/// Configuration types
pub mod config;
/// SQLite history persistence
pub mod db;
/// Error types
pub mod error;
/// yt-dlp metadata fetching and download execution
pub mod extractor;
/// History store abstraction
pub mod history;
/// Relay composition root
pub mod relay;
/// Per-connection session protocol
pub mod session;
/// Core types and protocol messages
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use catalog::FormatCatalog;
pub use config::{BusyPolicy, Config, HistoryBackend};
pub use db::Database;
pub use error::{ApiError, DatabaseError, Error, ErrorDetail, Result, ToHttpStatus};
pub use extractor::{
    CliExtractor, ExtractorCapabilities, MediaExtractor, NoOpExtractor, ProgressSink,
};
pub use history::{HistoryStore, MemoryHistoryStore};
pub use relay::MediaRelay;
pub use session::{EventReceiver, SessionHandler, SessionState};
pub use types::{
    ClientCommand, DownloadOutcome, DownloadRequest, ErrorStep, FormatOption, HistoryRecord,
    ServerEvent, TrackInfo, VideoMetadata,
};

/// Serve the relay until a termination signal arrives, then shut down.
///
/// Starts the HTTP server, waits for SIGTERM/SIGINT (Ctrl+C elsewhere) or
/// for the server to stop on its own, then cancels the relay's shutdown
/// token and waits for the server to drain.
pub async fn run_with_shutdown(relay: std::sync::Arc<MediaRelay>) -> Result<()> {
    let mut server = relay.spawn_api_server();

    let early_exit = tokio::select! {
        _ = wait_for_signal() => None,
        result = &mut server => Some(result),
    };

    relay.shutdown();

    let result = match early_exit {
        Some(result) => result,
        None => server.await,
    };
    result.map_err(|e| Error::ApiServerError(format!("server task failed: {e}")))?
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = sigint.recv() => tracing::info!("received SIGINT"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("received SIGTERM");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("received SIGINT");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C"),
        Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
    }
}
