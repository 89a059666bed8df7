//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`formats`] - Format catalog
//! - [`media`] - Video info lookup and download preparation
//! - [`history`] - Download history
//! - [`files`] - Serving stored files
//! - [`session`] - WebSocket session endpoint
//! - [`system`] - Health, capabilities, OpenAPI

use crate::types::VideoMetadata;
use serde::{Deserialize, Serialize};

mod files;
mod formats;
mod history;
mod media;
mod session;
mod system;

pub use files::*;
pub use formats::*;
pub use history::*;
pub use media::*;
pub use session::*;
pub use system::*;

// ============================================================================
// Query/Response Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InfoQuery {
    /// Page URL to look up
    pub url: Option<String>,
}

/// Query parameters for GET /history
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HistoryQuery {
    /// Maximum number of records to return (default: `session.history_limit`)
    pub limit: Option<usize>,
}

/// Response for POST /download
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadStarted {
    /// Always "Download started"
    pub message: String,
    /// Metadata of the requested video
    pub video_info: VideoMetadata,
    /// Catalog label of the requested selector
    pub format_label: String,
}

/// Response for DELETE /history and other acknowledgements
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

/// Response for GET /capabilities
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RelayCapabilities {
    /// Extractor implementation name
    pub extractor: String,
    /// Whether metadata lookups can succeed
    pub can_fetch_metadata: bool,
    /// Whether downloads can succeed
    pub can_download: bool,
    /// History store implementation name
    pub history_store: String,
    /// Number of catalog entries
    pub formats: usize,
    /// Behavior when a session receives a download while busy
    pub busy_policy: crate::config::BusyPolicy,
}
