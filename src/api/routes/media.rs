//! Video info and download preparation handlers.

use super::{DownloadStarted, InfoQuery};
use crate::api::AppState;
use crate::error::ApiError;
use crate::types::{DownloadRequest, VideoMetadata};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

/// GET /info - Fetch metadata for a page URL
#[utoipa::path(
    get,
    path = "/api/info",
    tag = "media",
    params(
        ("url" = String, Query, description = "Page URL to inspect")
    ),
    responses(
        (status = 200, description = "Video metadata", body = VideoMetadata),
        (status = 400, description = "Missing or invalid URL"),
        (status = 501, description = "yt-dlp is not installed"),
        (status = 502, description = "yt-dlp failed")
    )
)]
pub async fn get_video_info(
    State(state): State<AppState>,
    Query(query): Query<InfoQuery>,
) -> impl IntoResponse {
    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("URL is required")),
        )
            .into_response();
    };

    match state.relay.extractor().fetch_metadata(&url).await {
        Ok(info) => Json(info).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /download - Validate a request and return the video it refers to
///
/// The transfer itself runs over the WebSocket session; this endpoint lets
/// plain HTTP clients check a URL and selector before opening one.
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "media",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Request accepted", body = DownloadStarted),
        (status = 400, description = "Invalid URL or empty format"),
        (status = 501, description = "yt-dlp is not installed"),
        (status = 502, description = "yt-dlp failed")
    )
)]
pub async fn prepare_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> crate::Result<Json<DownloadStarted>> {
    request.validate()?;
    let video_info = state.relay.extractor().fetch_metadata(&request.url).await?;

    Ok(Json(DownloadStarted {
        message: "Download started".into(),
        video_info,
        format_label: state.relay.catalog().label_for(&request.format),
    }))
}
