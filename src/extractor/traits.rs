//! Traits and types for media extraction

use crate::types::{DownloadOutcome, VideoMetadata};
use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

/// Receiver for progress percentages while a download runs
///
/// Called once per progress line, in the order the tool printed them.
/// Implementations must not block.
pub trait ProgressSink: Send + Sync {
    /// Report one progress value
    fn report(&self, percent: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}

/// Capabilities of an extractor implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExtractorCapabilities {
    /// Can fetch video metadata
    pub can_fetch_metadata: bool,
    /// Can download media files
    pub can_download: bool,
}

/// Trait for fetching metadata and downloading media from a page URL
///
/// Implementations can drive an external binary or provide stub
/// functionality when no tool is installed.
///
/// # Examples
///
/// ```no_run
/// use ytdl_relay::extractor::{CliExtractor, MediaExtractor};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = CliExtractor::from_path("downloads")
///     .expect("yt-dlp not found in PATH");
///
/// let info = extractor.fetch_metadata("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
/// println!("{} ({} formats)", info.title, info.tracks.len());
///
/// let outcome = extractor
///     .download(
///         "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
///         "bestaudio[ext=m4a]/bestaudio/best",
///         &|percent: f64| println!("{percent}%"),
///     )
///     .await?;
/// println!("stored as {}", outcome.file_name);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Fetch metadata for a single video
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is not a syntactically valid http(s) URL
    /// - The tool cannot be spawned or exits non-zero
    /// - The tool output is not a metadata document
    async fn fetch_metadata(&self, url: &str) -> crate::Result<VideoMetadata>;

    /// Download one video in the given format, reporting progress as it arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be spawned, exits non-zero, or
    /// never announces where it stored the file.
    async fn download(
        &self,
        url: &str,
        selector: &str,
        progress: &dyn ProgressSink,
    ) -> crate::Result<DownloadOutcome>;

    /// Query capabilities of this extractor
    fn capabilities(&self) -> ExtractorCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
