//! System handlers: health, capabilities, OpenAPI.

use super::RelayCapabilities;
use crate::api::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /capabilities - What this relay can currently do
#[utoipa::path(
    get,
    path = "/api/capabilities",
    tag = "system",
    responses(
        (status = 200, description = "Current relay capabilities", body = RelayCapabilities)
    )
)]
pub async fn get_capabilities(State(state): State<AppState>) -> impl IntoResponse {
    let extractor = state.relay.extractor();
    let tool = extractor.capabilities();

    let capabilities = RelayCapabilities {
        extractor: extractor.name().to_string(),
        can_fetch_metadata: tool.can_fetch_metadata,
        can_download: tool.can_download,
        history_store: state.relay.history().name().to_string(),
        formats: state.relay.catalog().len(),
        busy_policy: state.config.session.busy_policy,
    };
    (StatusCode::OK, Json(capabilities))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/api/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
