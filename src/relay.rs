//! Composition root: wires configuration, extractor, history store and catalog together

use crate::catalog::FormatCatalog;
use crate::config::{Config, HistoryBackend};
use crate::db::Database;
use crate::error::Result;
use crate::extractor::{CliExtractor, MediaExtractor, NoOpExtractor};
use crate::history::{HistoryStore, MemoryHistoryStore};
use crate::session::{EventReceiver, SessionContext, SessionHandler};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A running relay instance
///
/// Cheap to share behind an `Arc`; every HTTP request and every session
/// borrows the same extractor, store and catalog.
///
/// # Examples
///
/// ```no_run
/// use ytdl_relay::{Config, MediaRelay};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let relay = MediaRelay::new(Config::default()).await?;
///
///     let (session, mut events) = relay.open_session();
///     session
///         .handle_message(r#"{"action":"download","data":{"url":"https://vimeo.com/76979871","format":"best"}}"#)
///         .await;
///     while let Some(event) = events.recv().await {
///         println!("{}", serde_json::to_string(&event)?);
///         if event.is_terminal() {
///             break;
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct MediaRelay {
    config: Arc<Config>,
    extractor: Arc<dyn MediaExtractor>,
    history: Arc<dyn HistoryStore>,
    catalog: Arc<FormatCatalog>,
    shutdown: CancellationToken,
}

impl MediaRelay {
    /// Build a relay from configuration
    ///
    /// Creates the download directory, opens the configured history store,
    /// and locates yt-dlp (falling back to a no-op extractor if it is absent).
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        tokio::fs::create_dir_all(config.download_dir()).await?;

        let history: Arc<dyn HistoryStore> = match config.persistence.backend {
            HistoryBackend::Sqlite => {
                Arc::new(Database::new(&config.persistence.database_path).await?)
            }
            HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new()),
        };
        let extractor = build_extractor(&config).await;

        tracing::info!(
            extractor = extractor.name(),
            history = history.name(),
            download_dir = %config.download_dir().display(),
            "relay initialized"
        );

        Ok(Self::with_components(
            config,
            extractor,
            history,
            FormatCatalog::builtin(),
        ))
    }

    /// Build a relay from already constructed parts
    pub fn with_components(
        config: Config,
        extractor: Arc<dyn MediaExtractor>,
        history: Arc<dyn HistoryStore>,
        catalog: FormatCatalog,
    ) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
            history,
            catalog: Arc::new(catalog),
            shutdown: CancellationToken::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Metadata fetcher and download executor
    pub fn extractor(&self) -> &Arc<dyn MediaExtractor> {
        &self.extractor
    }

    /// Shared history store
    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Format catalog
    pub fn catalog(&self) -> &Arc<FormatCatalog> {
        &self.catalog
    }

    /// Services handed to each new session
    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            extractor: self.extractor.clone(),
            history: self.history.clone(),
            catalog: self.catalog.clone(),
            busy_policy: self.config.session.busy_policy,
        }
    }

    /// Open a new client session
    pub fn open_session(&self) -> (SessionHandler, EventReceiver) {
        SessionHandler::open(self.session_context())
    }

    /// Token cancelled when the relay shuts down
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop the HTTP server and close open sessions
    ///
    /// Download jobs already running are not interrupted.
    pub fn shutdown(&self) {
        tracing::info!("relay shutting down");
        self.shutdown.cancel();
    }

    /// Start the API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let relay = self.clone();
        tokio::spawn(async move { crate::api::start_api_server(relay).await })
    }
}

/// Pick the extractor implementation for a configuration
///
/// An explicit `tools.ytdlp_path` wins; otherwise PATH is searched when
/// `tools.search_path` is set. The version probe is informational only.
pub async fn build_extractor(config: &Config) -> Arc<dyn MediaExtractor> {
    let tools = &config.tools;
    let download = &config.download;

    let cli = match &tools.ytdlp_path {
        Some(path) => Some(CliExtractor::new(path.clone(), download.download_dir.clone())),
        None if tools.search_path => CliExtractor::from_path(download.download_dir.clone()),
        None => None,
    };

    let Some(cli) = cli else {
        tracing::warn!("yt-dlp not found; metadata and download requests will fail");
        return Arc::new(NoOpExtractor);
    };

    let cli = cli
        .with_audio_format(download.audio_format.clone())
        .with_extra_args(tools.extra_args.clone());

    match cli.version().await {
        Ok(version) => {
            tracing::info!(path = %cli.binary_path().display(), version = %version, "found yt-dlp")
        }
        Err(e) => {
            tracing::warn!(path = %cli.binary_path().display(), error = %e, "yt-dlp version probe failed")
        }
    }

    Arc::new(cli)
}
