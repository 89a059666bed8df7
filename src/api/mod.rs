//! HTTP server module
//!
//! Exposes the session WebSocket plus a small REST surface for format
//! listing, metadata lookup, history and stored files. Every route lives
//! under `/api`.

use crate::{MediaRelay, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the router with all route definitions
///
/// # Routes
///
/// ## Session
/// - `GET /api/ws` - WebSocket session (download, clearHistory)
///
/// ## Media
/// - `GET /api/formats` - Format catalog
/// - `GET /api/info?url=` - Video metadata
/// - `POST /api/download` - Validate a request and return its metadata
///
/// ## History
/// - `GET /api/history` - Recent downloads, newest first
/// - `DELETE /api/history` - Clear history
///
/// ## Files
/// - `GET /api/files/:file_name` - Download a stored file
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/capabilities` - Extractor and store capabilities
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(relay: Arc<MediaRelay>) -> Router {
    let state = AppState::new(relay);
    let api_config = state.config.server.api.clone();

    let api = Router::new()
        .route("/ws", get(routes::session_socket))
        .route("/formats", get(routes::list_formats))
        .route("/info", get(routes::get_video_info))
        .route("/download", post(routes::prepare_download))
        .route(
            "/history",
            get(routes::get_history).delete(routes::clear_history),
        )
        .route("/files/:file_name", get(routes::get_file))
        .route("/health", get(routes::health_check))
        .route("/capabilities", get(routes::get_capabilities))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new().nest("/api", api);

    // Swagger UI gets its own spec route so it does not collide with /api/openapi.json
    let router = if api_config.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if api_config.cors_enabled {
        router.layer(build_cors_layer(&api_config.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allow_any || origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Start the HTTP server on the configured bind address.
///
/// Runs until the relay's shutdown token is cancelled, then stops accepting
/// connections and returns once in-flight requests finish.
///
/// # Example
///
/// ```no_run
/// use ytdl_relay::{Config, MediaRelay};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let relay = Arc::new(MediaRelay::new(Config::default()).await?);
///
/// // Blocks until relay.shutdown() is called
/// ytdl_relay::api::start_api_server(relay).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(relay: Arc<MediaRelay>) -> Result<()> {
    let bind_address = relay.config().server.api.bind_address;
    let shutdown = relay.shutdown_token();

    tracing::info!(address = %bind_address, "starting API server");

    let app = create_router(relay);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    let local_address = listener.local_addr().map_err(crate::error::Error::Io)?;
    tracing::info!(address = %local_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
