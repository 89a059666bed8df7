//! History handlers.

use super::{HistoryQuery, MessageResponse};
use crate::api::AppState;
use crate::error::ApiError;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

/// GET /history - Most recent downloads, newest first
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "history",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum number of records to return")
    ),
    responses(
        (status = 200, description = "Download history", body = Vec<crate::types::HistoryRecord>),
        (status = 400, description = "Invalid limit"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(state.config.session.history_limit);
    if limit == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("limit must be greater than zero")),
        )
            .into_response();
    }

    match state.relay.history().list_by_recency_desc(Some(limit)).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /history - Remove every history record
#[utoipa::path(
    delete,
    path = "/api/history",
    tag = "history",
    responses(
        (status = 200, description = "History cleared", body = MessageResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    match state.relay.history().clear_all().await {
        Ok(removed) => {
            tracing::info!(removed, "download history cleared");
            Json(MessageResponse {
                message: "Download history cleared".into(),
            })
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}
