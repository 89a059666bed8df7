//! Core types: data model, jobs, history records and the session wire protocol

use crate::error::{Error, Result};
use crate::utils::validate_url;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// One entry of the format catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormatOption {
    /// Selector expression handed to the extraction tool as-is
    #[serde(rename = "value")]
    pub selector: String,
    /// Presentation text
    pub label: String,
}

/// A single downloadable track as reported by the extraction tool
///
/// Every field is optional: the tool's per-format records vary by site and
/// version, and an incomplete record still describes a track.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrackInfo {
    /// Tool-specific format identifier (`format_id`)
    #[serde(rename = "format_id", skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    /// File extension / container (`ext`)
    #[serde(rename = "ext", skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Resolution string such as "1920x1080" or "audio only"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Exact or approximate size in bytes
    #[serde(rename = "filesize", skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Free-form note such as "1080p" or "medium"
    #[serde(rename = "format_note", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Metadata for one video, produced fresh by every fetch
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoMetadata {
    /// Site-specific video ID
    pub id: String,
    /// Video title
    pub title: String,
    /// Description text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Thumbnail image URL
    #[serde(rename = "thumbnail", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Duration in seconds
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Uploader / channel name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Available tracks
    #[serde(rename = "formats", default)]
    pub tracks: Vec<TrackInfo>,
}

/// Parameters of a download command (`data` of the `download` action)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Page URL to extract from
    pub url: String,
    /// Format selector, usually one of the catalog values
    pub format: String,
}

impl DownloadRequest {
    /// Check the request before any subprocess is spawned
    ///
    /// `url` must be an http(s) URL and `format` must be non-empty.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.url)?;
        if self.format.trim().is_empty() {
            return Err(Error::Validation("format must not be empty".into()));
        }
        Ok(())
    }
}

/// Where a finished download ended up
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Full path of the stored file
    pub stored_path: PathBuf,
    /// Final path component of `stored_path`
    pub file_name: String,
}

impl DownloadOutcome {
    /// Build an outcome from a path announced by the tool
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let stored_path = path.into();
        let file_name = stored_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| stored_path.to_string_lossy().into_owned());
        Self {
            stored_path,
            file_name,
        }
    }
}

/// Lifecycle state of a [`DownloadJob`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Created, nothing started yet
    Idle,
    /// Metadata subprocess running
    FetchingMetadata,
    /// Download subprocess running
    Downloading,
    /// File stored, history written
    Completed,
    /// Aborted by an error
    Failed,
}

impl JobState {
    /// Whether no further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Transient in-memory record of one download command
#[derive(Clone, Debug)]
pub struct DownloadJob {
    /// Page URL
    pub url: String,
    /// Format selector
    pub selector: String,
    /// Current lifecycle state
    pub state: JobState,
    /// Most recent progress value reported by the tool
    pub last_progress_percent: Option<f64>,
    /// Stored file path once known
    pub resolved_file_path: Option<PathBuf>,
    /// Stored file name once known
    pub resolved_file_name: Option<String>,
}

impl DownloadJob {
    /// Create an idle job
    pub fn new(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: selector.into(),
            state: JobState::Idle,
            last_progress_percent: None,
            resolved_file_path: None,
            resolved_file_name: None,
        }
    }

    /// Record a progress report
    pub fn record_progress(&mut self, percent: f64) {
        self.last_progress_percent = Some(percent);
    }

    /// Mark the job completed with its resolved output
    pub fn complete(&mut self, outcome: &DownloadOutcome) {
        self.resolved_file_path = Some(outcome.stored_path.clone());
        self.resolved_file_name = Some(outcome.file_name.clone());
        self.state = JobState::Completed;
    }
}

/// A finished download as stored in history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Store-assigned identifier
    pub id: i64,
    /// Page URL
    pub url: String,
    /// Video title
    pub title: String,
    /// Thumbnail image URL
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: Option<String>,
    /// Format selector used
    #[serde(rename = "format")]
    pub selector: String,
    /// Catalog label for the selector
    pub format_label: String,
    /// Duration in seconds
    #[serde(rename = "duration")]
    pub duration_seconds: Option<f64>,
    /// Stored file size in bytes
    #[serde(rename = "fileSize")]
    pub file_size_bytes: Option<u64>,
    /// Stored file name
    pub file_name: String,
    /// Full stored path
    #[serde(rename = "downloadPath")]
    pub stored_path: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// History record before the store assigns `id` and `created_at`
#[derive(Clone, Debug, PartialEq)]
pub struct NewHistoryRecord {
    /// Page URL
    pub url: String,
    /// Video title
    pub title: String,
    /// Thumbnail image URL
    pub thumbnail_url: Option<String>,
    /// Format selector used
    pub selector: String,
    /// Catalog label for the selector
    pub format_label: String,
    /// Duration in seconds
    pub duration_seconds: Option<f64>,
    /// Stored file size in bytes
    pub file_size_bytes: Option<u64>,
    /// Stored file name
    pub file_name: String,
    /// Full stored path
    pub stored_path: String,
}

impl NewHistoryRecord {
    /// Attach store-assigned fields
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord {
            id,
            url: self.url,
            title: self.title,
            thumbnail_url: self.thumbnail_url,
            selector: self.selector,
            format_label: self.format_label,
            duration_seconds: self.duration_seconds,
            file_size_bytes: self.file_size_bytes,
            file_name: self.file_name,
            stored_path: self.stored_path,
            created_at,
        }
    }
}

/// Command sent by a client over a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientCommand {
    /// Fetch metadata, then download
    Download {
        /// Request parameters
        data: DownloadRequest,
    },
    /// Delete every history record
    ClearHistory,
}

/// Which phase of a job an `error` event refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStep {
    /// Metadata fetch
    VideoInfo,
    /// Download subprocess
    Download,
    /// Anything not attributable to a phase
    Unknown,
}

/// Event sent by the server over a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Metadata for the job's URL
    VideoInfo {
        /// Fetched metadata
        #[serde(rename = "videoInfo")]
        video_info: VideoMetadata,
    },

    /// Download progress (percent, not necessarily monotonic)
    Progress {
        /// Percentage as reported by the tool
        progress: f64,
    },

    /// Job finished and the file is stored
    Complete {
        /// Stored file name
        #[serde(rename = "fileName")]
        file_name: String,
        /// Full stored path
        #[serde(rename = "downloadPath")]
        download_path: String,
    },

    /// A command or job failed
    Error {
        /// Human-readable description
        message: String,
        /// Failed phase, absent for command-level errors
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<ErrorStep>,
    },

    /// History was cleared
    HistoryCleared,
}

impl ServerEvent {
    /// Error event without a phase tag
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
            step: None,
        }
    }

    /// Error event tagged with the failed phase
    pub fn step_error(step: ErrorStep, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
            step: Some(step),
        }
    }

    /// Whether this event ends a job
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServerEvent::Complete { .. } | ServerEvent::Error { .. })
    }
}
