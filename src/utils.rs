//! Utility functions for URL validation and download-directory paths

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Check that `raw` is an absolute http(s) URL with a host
///
/// This is a syntactic check only; whether a site is supported is up to the
/// extraction tool.
///
/// # Examples
///
/// ```
/// use ytdl_relay::utils::validate_url;
///
/// assert!(validate_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
/// assert!(validate_url("ftp://example.com/file").is_err());
/// assert!(validate_url("watch?v=1").is_err());
/// ```
pub fn validate_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("URL is empty".into()));
    }

    let url = Url::parse(trimmed).map_err(|e| Error::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, trimmed
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(format!("missing host in {}", trimmed)));
    }

    Ok(url)
}

/// Resolve a client-supplied file name to a path inside `download_dir`
///
/// Only a single plain path component is accepted: separators, `..`, `.`
/// and absolute paths are rejected so a request can never escape the
/// directory.
pub fn resolve_download_file(download_dir: &Path, file_name: &str) -> Result<PathBuf> {
    if file_name.is_empty() {
        return Err(Error::Validation("file name is empty".into()));
    }
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains('\0') {
        return Err(Error::Validation(format!(
            "file name must not contain path separators: {}",
            file_name
        )));
    }

    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(download_dir.join(file_name)),
        _ => Err(Error::Validation(format!("invalid file name: {}", file_name))),
    }
}

/// `Content-Disposition` value for serving a stored file as an attachment
pub fn attachment_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"",
        urlencoding::encode(file_name)
    )
}

/// Size of a stored file, or `None` if it cannot be inspected
pub async fn file_size(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not stat downloaded file");
            None
        }
    }
}
