//! Stored file handler.

use crate::api::AppState;
use crate::error::ApiError;
use crate::utils::{attachment_disposition, resolve_download_file};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tokio_util::io::ReaderStream;

/// GET /files/:file_name - Stream a stored file as an attachment
#[utoipa::path(
    get,
    path = "/api/files/{file_name}",
    tag = "files",
    params(
        ("file_name" = String, Path, description = "Name of a file in the download directory")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "File name is not a plain file name"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    let path = match resolve_download_file(state.config.download_dir(), &file_name) {
        Ok(path) => path,
        Err(e) => return e.into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiError::not_found("File")),
            )
                .into_response();
        }
        Err(e) => return crate::Error::Io(e).into_response(),
    };

    let metadata = match file.metadata().await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiError::not_found("File")),
            )
                .into_response();
        }
        Err(e) => return crate::Error::Io(e).into_response(),
    };

    tracing::debug!(file = %file_name, bytes = metadata.len(), "serving stored file");

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
            (header::CONTENT_DISPOSITION, attachment_disposition(&file_name)),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response()
}
