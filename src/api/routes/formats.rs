//! Format catalog handler.

use crate::api::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// GET /formats - List the format catalog in presentation order
#[utoipa::path(
    get,
    path = "/api/formats",
    tag = "formats",
    responses(
        (status = 200, description = "Format catalog", body = Vec<crate::types::FormatOption>)
    )
)]
pub async fn list_formats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.relay.catalog().options().to_vec())
}
