//! Configuration types for ytdl-relay

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};
use utoipa::ToSchema;

/// Download behavior configuration (storage directory, audio container)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Directory all downloaded files land in (default: "./temp-downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Audio container requested when a selector asks for audio extraction (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            audio_format: default_audio_format(),
        }
    }
}

/// External extraction tool configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Extra arguments appended to every invocation (before the URL)
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            extra_args: vec![],
        }
    }
}

/// History storage backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBackend {
    /// SQLite database at `database_path`
    #[default]
    Sqlite,
    /// Process-local map, lost on restart
    Memory,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Which history store to use (default: sqlite)
    #[serde(default)]
    pub backend: HistoryBackend,

    /// Database path (default: "./ytdl-relay.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::default(),
            database_path: default_database_path(),
        }
    }
}

/// What a session does with a `download` command while another one runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Answer with an `error` event and drop the command
    #[default]
    Reject,
    /// Hold the command and run it once the current job has finished
    Queue,
}

/// Session protocol configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionConfig {
    /// Handling of overlapping download commands (default: reject)
    #[serde(default)]
    pub busy_policy: BusyPolicy,

    /// Default number of records returned by `GET /history` (default: 100)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            busy_policy: BusyPolicy::default(),
            history_limit: default_history_limit(),
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// HTTP API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for the relay
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// History storage settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Session protocol settings
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if self.download.download_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "download_dir must not be empty".into(),
                key: Some("download_dir".into()),
            });
        }
        if self.download.audio_format.trim().is_empty() {
            return Err(Error::Config {
                message: "audio_format must not be empty".into(),
                key: Some("audio_format".into()),
            });
        }
        if self.session.history_limit == 0 {
            return Err(Error::Config {
                message: "history_limit must be greater than zero".into(),
                key: Some("history_limit".into()),
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_download_dir() -> PathBuf {
    PathBuf::from("temp-downloads")
}

fn default_audio_format() -> String {
    "mp3".into()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("ytdl-relay.db")
}

fn default_history_limit() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.download_dir(), &PathBuf::from("temp-downloads"));
        assert_eq!(config.download.audio_format, "mp3");
        assert_eq!(config.persistence.backend, HistoryBackend::Sqlite);
        assert_eq!(config.session.busy_policy, BusyPolicy::Reject);
        assert_eq!(config.session.history_limit, 100);
        assert_eq!(
            config.server.api.bind_address,
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );
        assert!(config.tools.search_path);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.download.download_dir, default_download_dir());
        assert_eq!(config.persistence.database_path, default_database_path());
        assert!(config.server.api.cors_enabled);
    }

    #[test]
    fn test_partial_json_overrides_only_given_fields() {
        let config: Config = serde_json::from_str(
            r#"{
                "download": {"download_dir": "/srv/media"},
                "tools": {"ytdlp_path": "/opt/bin/yt-dlp", "extra_args": ["--no-mtime"]},
                "persistence": {"backend": "memory"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.download.download_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.download.audio_format, "mp3");
        assert_eq!(
            config.tools.ytdlp_path,
            Some(PathBuf::from("/opt/bin/yt-dlp"))
        );
        assert_eq!(config.tools.extra_args, vec!["--no-mtime".to_string()]);
        assert_eq!(config.persistence.backend, HistoryBackend::Memory);
    }

    #[test]
    fn test_validate_rejects_zero_history_limit() {
        let mut config = Config::default();
        config.session.history_limit = 0;
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("history_limit")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_empty_download_dir() {
        let mut config = Config::default();
        config.download.download_dir = PathBuf::new();
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("download_dir")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::from_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_from_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.download.audio_format = "opus".into();
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        let loaded = Config::from_json_file(&path).unwrap();
        assert_eq!(loaded.download.audio_format, "opus");
    }
}
