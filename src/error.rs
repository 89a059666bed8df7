//! Error types for ytdl-relay
//!
//! This module provides the error taxonomy for the relay:
//! - Request errors (invalid URL, malformed command)
//! - External tool errors (non-zero exit, unresolvable output path)
//! - Persistence errors (history store failures)
//! - HTTP status code mapping and structured error bodies for the REST API

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for ytdl-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ytdl-relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// URL failed syntactic validation before any subprocess was spawned
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A command or request body failed schema validation
    #[error("validation error: {0}")]
    Validation(String),

    /// The external extraction tool could not be run or exited unsuccessfully
    ///
    /// Carries the captured error-channel text when the process ran.
    #[error("external tool error: {message}")]
    ExternalTool {
        /// Exit code of the process, if it ran to completion
        exit_code: Option<i32>,
        /// Captured stderr text or spawn failure description
        message: String,
    },

    /// The tool exited successfully but never announced an output file
    #[error("could not determine the downloaded file path")]
    UnresolvedOutput,

    /// History persistence failed
    #[error("persistence error: {0}")]
    Persistence(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// A download is already running on this session
    #[error("a download is already in progress on this session")]
    SessionBusy,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Operation not supported (missing binary, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::ExternalTool`] from a failed process run
    pub fn external_tool(exit_code: Option<i32>, message: impl Into<String>) -> Self {
        Error::ExternalTool {
            exit_code,
            message: message.into(),
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// API error response format
///
/// Returned by REST endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_url",
///     "message": "invalid URL: relative URL without a base"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidUrl(_) => 400,
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict - a job is already running
            Error::SessionBusy => 409,

            // 500 Internal Server Error - Server-side issues
            Error::Persistence(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - the external tool misbehaved
            Error::ExternalTool { .. } => 502,
            Error::UnresolvedOutput => 502,

            // 501 Not Implemented - Feature not supported
            Error::NotSupported(_) => 501,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Validation(_) => "validation_error",
            Error::ExternalTool { .. } => "external_tool_error",
            Error::UnresolvedOutput => "unresolved_output",
            Error::Persistence(_) => "persistence_error",
            Error::Sqlx(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::NotFound(_) => "not_found",
            Error::SessionBusy => "session_busy",
            Error::ApiServerError(_) => "api_server_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::ExternalTool {
                exit_code: Some(exit_code),
                ..
            } => Some(serde_json::json!({
                "exit_code": exit_code,
            })),
            _ => None,
        };

        match details {
            Some(details) => ApiError::with_details(code, message, details),
            None => ApiError::new(code, message),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("download_dir".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::InvalidUrl("not a url".into()),
                400,
                "invalid_url",
            ),
            (
                Error::Validation("format is empty".into()),
                400,
                "validation_error",
            ),
            (Error::NotFound("file x.mp4".into()), 404, "not_found"),
            (Error::SessionBusy, 409, "session_busy"),
            (
                Error::Persistence(DatabaseError::QueryFailed("timeout".into())),
                500,
                "persistence_error",
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::Other("unknown".into()), 500, "internal_error"),
            (
                Error::external_tool(Some(1), "ERROR: Unsupported URL"),
                502,
                "external_tool_error",
            ),
            (Error::UnresolvedOutput, 502, "unresolved_output"),
            (
                Error::NotSupported("yt-dlp binary missing".into()),
                501,
                "not_supported",
            ),
        ]
    }

    #[test]
    fn test_every_variant_maps_to_status_and_code() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {error:?}");
            assert_eq!(error.error_code(), code, "code for {error:?}");
        }
    }

    #[test]
    fn test_external_tool_message_includes_stderr() {
        let error = Error::external_tool(Some(7), "ERROR: [youtube] abc: Video unavailable");
        assert_eq!(
            error.to_string(),
            "external tool error: ERROR: [youtube] abc: Video unavailable"
        );
    }

    #[test]
    fn test_api_error_carries_exit_code_detail() {
        let api_error: ApiError = Error::external_tool(Some(7), "boom").into();
        assert_eq!(api_error.error.code, "external_tool_error");
        assert_eq!(api_error.error.details.unwrap()["exit_code"], 7);
    }

    #[test]
    fn test_api_error_carries_config_key_detail() {
        let api_error: ApiError = Error::Config {
            message: "history_limit must be greater than zero".into(),
            key: Some("history_limit".into()),
        }
        .into();
        assert_eq!(api_error.error.details.unwrap()["key"], "history_limit");
    }

    #[test]
    fn test_api_error_without_details_omits_field() {
        let api_error: ApiError = Error::UnresolvedOutput.into();
        let json = serde_json::to_value(&api_error).unwrap();
        assert!(json["error"].get("details").is_none());
        assert_eq!(
            json["error"]["message"],
            "could not determine the downloaded file path"
        );
    }

    #[test]
    fn test_api_error_constructors() {
        assert_eq!(ApiError::not_found("file").error.message, "file not found");
        assert_eq!(ApiError::validation("bad").error.code, "validation_error");
        let detailed = ApiError::with_details("x", "y", serde_json::json!({"a": 1}));
        assert_eq!(detailed.error.details.unwrap()["a"], 1);
    }
}
