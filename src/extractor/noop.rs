//! No-op extractor for running without yt-dlp

use super::traits::{ExtractorCapabilities, MediaExtractor, ProgressSink};
use crate::types::{DownloadOutcome, VideoMetadata};
use async_trait::async_trait;

/// Extractor used when no yt-dlp binary is available or configured
///
/// Every operation fails with `Error::NotSupported`, which sessions report as
/// an ordinary step error. The rest of the relay (catalog, history, files)
/// keeps working.
pub struct NoOpExtractor;

const MISSING_BINARY: &str =
    "yt-dlp binary not found. Configure tools.ytdlp_path or ensure yt-dlp is in PATH.";

#[async_trait]
impl MediaExtractor for NoOpExtractor {
    async fn fetch_metadata(&self, _url: &str) -> crate::Result<VideoMetadata> {
        Err(crate::Error::NotSupported(MISSING_BINARY.into()))
    }

    async fn download(
        &self,
        _url: &str,
        _selector: &str,
        _progress: &dyn ProgressSink,
    ) -> crate::Result<DownloadOutcome> {
        Err(crate::Error::NotSupported(MISSING_BINARY.into()))
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_fetch_metadata: false,
            can_download: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
