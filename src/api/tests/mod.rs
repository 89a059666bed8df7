use super::*;
use crate::Config;
use crate::catalog::FormatCatalog;
use crate::config::HistoryBackend;
use crate::error::Error;
use crate::extractor::{ExtractorCapabilities, MediaExtractor, NoOpExtractor, ProgressSink};
use crate::history::{HistoryStore, MemoryHistoryStore};
use crate::types::{DownloadOutcome, NewHistoryRecord, VideoMetadata};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Extractor returning fixed metadata; URLs containing "unavailable" fail like yt-dlp does
struct StubExtractor;

#[async_trait]
impl MediaExtractor for StubExtractor {
    async fn fetch_metadata(&self, url: &str) -> crate::Result<VideoMetadata> {
        crate::utils::validate_url(url)?;
        if url.contains("unavailable") {
            return Err(Error::external_tool(Some(1), "ERROR: Video unavailable"));
        }
        Ok(VideoMetadata {
            id: "dQw4w9WgXcQ".into(),
            title: "Never Gonna Give You Up".into(),
            duration_seconds: Some(212.0),
            ..Default::default()
        })
    }

    async fn download(
        &self,
        _url: &str,
        _selector: &str,
        _progress: &dyn ProgressSink,
    ) -> crate::Result<DownloadOutcome> {
        Err(Error::UnresolvedOutput)
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_fetch_metadata: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.download_dir = dir.path().join("downloads");
    config.persistence.backend = HistoryBackend::Memory;
    config.tools.search_path = false;
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    config
}

/// Relay over a stub extractor and an in-memory store, download dir created
fn create_test_relay_with(
    config: Config,
    extractor: Arc<dyn MediaExtractor>,
) -> Arc<MediaRelay> {
    std::fs::create_dir_all(config.download_dir()).unwrap();
    Arc::new(MediaRelay::with_components(
        config,
        extractor,
        Arc::new(MemoryHistoryStore::new()),
        FormatCatalog::builtin(),
    ))
}

fn create_test_relay() -> (Arc<MediaRelay>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let relay = create_test_relay_with(test_config(&dir), Arc::new(StubExtractor));
    (relay, dir)
}

fn sample_record(title: &str) -> NewHistoryRecord {
    NewHistoryRecord {
        url: VIDEO_URL.into(),
        title: title.into(),
        thumbnail_url: None,
        selector: "best".into(),
        format_label: "best".into(),
        duration_seconds: Some(212.0),
        file_size_bytes: Some(1024),
        file_name: format!("{title}.mp4"),
        stored_path: format!("/downloads/{title}.mp4"),
    }
}

async fn get(app: axum::Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_serves_and_stops_on_shutdown() {
    let (relay, _dir) = create_test_relay();

    let handle = relay.spawn_api_server();
    tokio::time::sleep(Duration::from_millis(100)).await;
    relay.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_api_server_reports_bind_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = test_config(&dir);
    config.server.api.bind_address = blocker.local_addr().unwrap();
    let relay = create_test_relay_with(config, Arc::new(StubExtractor));

    let result = start_api_server(relay).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_cors_enabled() {
    let (relay, _dir) = create_test_relay();
    let app = create_router(relay);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.server.api.cors_origins = vec!["http://localhost:3000".into()];
    let app = create_router(create_test_relay_with(config, Arc::new(StubExtractor)));

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );

    let denied = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Origin", "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(
        !denied
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.server.api.cors_enabled = false;
    let app = create_router(create_test_relay_with(config, Arc::new(StubExtractor)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (relay, _dir) = create_test_relay();
    let response = get(create_router(relay), "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.server.api.swagger_ui = false;
    let app = create_router(create_test_relay_with(config, Arc::new(StubExtractor)));
    let response = get(app, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_routes_live_under_api_prefix() {
    let (relay, _dir) = create_test_relay();
    let response = get(create_router(relay), "/health").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let (relay, _dir) = create_test_relay();
    let response = get(create_router(relay), "/api/ws").await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_noop_extractor_reports_not_implemented() {
    let dir = tempfile::tempdir().unwrap();
    let relay = create_test_relay_with(test_config(&dir), Arc::new(NoOpExtractor));

    let uri = format!("/api/info?url={}", urlencoding::encode(VIDEO_URL));
    let response = get(create_router(relay), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(json_body(response).await["error"]["code"], "not_supported");
}
