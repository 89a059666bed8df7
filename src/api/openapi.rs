//! OpenAPI documentation and schema generation
//!
//! The specification is generated at compile time by utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the ytdl-relay REST API
///
/// Served at `/api/openapi.json`; the Swagger UI at `/swagger-ui` reads its
/// own copy from `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ytdl-relay REST API",
        version = "0.1.0",
        description = "Video metadata lookup, download history and stored file access for the yt-dlp relay. Downloads themselves run over the /api/ws session socket.",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        crate::api::routes::list_formats,
        crate::api::routes::get_video_info,
        crate::api::routes::prepare_download,
        crate::api::routes::get_history,
        crate::api::routes::clear_history,
        crate::api::routes::get_file,
        crate::api::routes::session_socket,
        crate::api::routes::health_check,
        crate::api::routes::get_capabilities,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::FormatOption,
        crate::types::TrackInfo,
        crate::types::VideoMetadata,
        crate::types::DownloadRequest,
        crate::types::HistoryRecord,
        crate::config::BusyPolicy,
        crate::api::routes::InfoQuery,
        crate::api::routes::HistoryQuery,
        crate::api::routes::DownloadStarted,
        crate::api::routes::MessageResponse,
        crate::api::routes::RelayCapabilities,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "formats", description = "Format catalog offered to clients"),
        (name = "media", description = "Video metadata lookup"),
        (name = "history", description = "Completed download history"),
        (name = "files", description = "Stored file retrieval"),
        (name = "session", description = "WebSocket session protocol"),
        (name = "system", description = "Health checks, capabilities, OpenAPI spec"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/api/formats",
            "/api/info",
            "/api/download",
            "/api/history",
            "/api/files/{file_name}",
            "/api/ws",
            "/api/health",
            "/api/capabilities",
            "/api/openapi.json",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_openapi_spec_has_schemas() {
        let spec = ApiDoc::openapi();
        let schemas = &spec.components.as_ref().unwrap().schemas;
        for name in ["VideoMetadata", "HistoryRecord", "FormatOption", "ApiError"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }

    #[test]
    fn test_openapi_spec_serializes() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(json["info"]["title"], "ytdl-relay REST API");
    }
}
