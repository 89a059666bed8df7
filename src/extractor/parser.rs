//! Parsers for yt-dlp output
//!
//! yt-dlp has no machine-readable progress channel when invoked with
//! `--newline`, so its human-oriented status lines are treated as a small
//! grammar. Every pattern the relay depends on lives in this file.

use super::traits::ProgressSink;
use crate::error::{Error, Result};
use crate::types::{DownloadOutcome, TrackInfo, VideoMetadata};
use futures::{Stream, StreamExt};
use regex::Regex;
use serde_json::Value;
use std::path::PathBuf;
use std::str;
use std::sync::LazyLock;

static PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(\d+(?:\.\d+)?)%").unwrap()
});

static EXTRACT_AUDIO_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\s*\[ExtractAudio\] Destination: (.+?)\s*$").unwrap()
});

static MERGER_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"^\s*\[Merger\] Merging formats into "(.+)"\s*$"#).unwrap()
});

static DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\s*\[download\] Destination: (.+?)\s*$").unwrap()
});

static ALREADY_DOWNLOADED: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\s*\[download\] (.+) has already been downloaded").unwrap()
});

/// Exit status of an external command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The command exited successfully (exit code 0)
    Success,
    /// The command exited unsuccessfully; `code` is None when killed by a signal
    Failure {
        /// Process exit code
        code: Option<i32>,
    },
}

impl ExitStatus {
    /// Returns `true` if the exit status represents success
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Exit code, if any
    pub fn code(self) -> Option<i32> {
        match self {
            Self::Success => Some(0),
            Self::Failure { code } => code,
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            Self::Success
        } else {
            Self::Failure {
                code: status.code(),
            }
        }
    }
}

/// A file path announced by the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathAnnouncement {
    /// `[download] Destination: <path>` (raw download target)
    Download(PathBuf),
    /// `[ExtractAudio] Destination: <path>` or `[Merger] Merging formats into "<path>"`
    PostProcessed(PathBuf),
    /// `[download] <path> has already been downloaded`
    AlreadyDownloaded(PathBuf),
}

/// What one output line tells us
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedLine {
    /// Percentage found in the line
    pub progress: Option<f64>,
    /// Path found in the line
    pub announcement: Option<PathAnnouncement>,
}

/// Classify a single line of download output
///
/// Lines that announce a path are not scanned for percentages, since file
/// names are free text.
pub fn parse_output_line(line: &str) -> ParsedLine {
    if let Some(caps) = EXTRACT_AUDIO_DESTINATION.captures(line) {
        return ParsedLine {
            progress: None,
            announcement: Some(PathAnnouncement::PostProcessed(PathBuf::from(&caps[1]))),
        };
    }
    if let Some(caps) = MERGER_DESTINATION.captures(line) {
        return ParsedLine {
            progress: None,
            announcement: Some(PathAnnouncement::PostProcessed(PathBuf::from(&caps[1]))),
        };
    }
    if let Some(caps) = DESTINATION.captures(line) {
        return ParsedLine {
            progress: None,
            announcement: Some(PathAnnouncement::Download(PathBuf::from(&caps[1]))),
        };
    }
    if let Some(caps) = ALREADY_DOWNLOADED.captures(line) {
        return ParsedLine {
            progress: None,
            announcement: Some(PathAnnouncement::AlreadyDownloaded(PathBuf::from(&caps[1]))),
        };
    }

    let progress = PERCENT
        .captures(line)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    ParsedLine {
        progress,
        announcement: None,
    }
}

/// Accumulates what a download run has announced so far
#[derive(Debug, Default, Clone)]
pub struct OutputTracker {
    download_destination: Option<PathBuf>,
    postprocessed: Option<PathBuf>,
    already_downloaded: Option<PathBuf>,
    last_progress: Option<f64>,
    lines_seen: usize,
}

impl OutputTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line; returns the progress value to report, if any
    pub fn observe(&mut self, line: &str) -> Option<f64> {
        self.lines_seen += 1;
        let parsed = parse_output_line(line);

        match parsed.announcement {
            Some(PathAnnouncement::Download(path)) => self.download_destination = Some(path),
            Some(PathAnnouncement::PostProcessed(path)) => self.postprocessed = Some(path),
            Some(PathAnnouncement::AlreadyDownloaded(path)) => {
                if self.download_destination.is_none() {
                    self.already_downloaded = Some(path);
                }
            }
            None => {}
        }

        if let Some(percent) = parsed.progress {
            self.last_progress = Some(percent);
        }
        parsed.progress
    }

    /// Best known output path: post-processed, then destination, then already-downloaded
    pub fn resolved_path(&self) -> Option<&PathBuf> {
        self.postprocessed
            .as_ref()
            .or(self.download_destination.as_ref())
            .or(self.already_downloaded.as_ref())
    }

    /// Most recent progress value
    pub fn last_progress(&self) -> Option<f64> {
        self.last_progress
    }

    /// Number of lines observed
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Turn the accumulated state plus the process result into an outcome
    ///
    /// A non-zero exit always fails with the captured stderr, regardless of
    /// progress already reported. A zero exit without any announced path fails
    /// with [`Error::UnresolvedOutput`].
    pub fn finish(self, exit_status: ExitStatus, stderr: &str) -> Result<DownloadOutcome> {
        if !exit_status.is_success() {
            return Err(tool_failure(exit_status, stderr));
        }
        match self.resolved_path() {
            Some(path) => Ok(DownloadOutcome::from_path(path.clone())),
            None => Err(Error::UnresolvedOutput),
        }
    }
}

/// Drain a stream of output lines into a tracker, reporting progress as it arrives
pub async fn track_download_output<S>(
    mut lines: S,
    progress: &dyn ProgressSink,
) -> std::io::Result<OutputTracker>
where
    S: Stream<Item = std::io::Result<String>> + Unpin,
{
    let mut tracker = OutputTracker::new();
    while let Some(line) = lines.next().await {
        let line = line?;
        tracing::trace!(line = %line, "yt-dlp output");
        if let Some(percent) = tracker.observe(&line) {
            progress.report(percent);
        }
    }
    Ok(tracker)
}

/// Build the error for a failed tool run
pub(crate) fn tool_failure(exit_status: ExitStatus, stderr: &str) -> Error {
    let code = exit_status.code();
    let stderr = stderr.trim();
    let code_text = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    if stderr.is_empty() {
        Error::external_tool(code, format!("yt-dlp exited with code {}", code_text))
    } else {
        Error::external_tool(
            code,
            format!("yt-dlp exited with code {}: {}", code_text, stderr),
        )
    }
}

/// Parse the output of `yt-dlp --dump-json --no-playlist <url>`
///
/// Fields are projected one by one; anything absent or of the wrong type is
/// left empty rather than failing the whole document.
pub fn parse_metadata_output(
    stdout: &[u8],
    stderr: &[u8],
    exit_status: ExitStatus,
) -> Result<VideoMetadata> {
    let error_output = String::from_utf8_lossy(stderr);
    if !exit_status.is_success() {
        return Err(tool_failure(exit_status, &error_output));
    }

    let output = str::from_utf8(stdout).map_err(|e| {
        Error::external_tool(Some(0), format!("metadata output is not UTF-8: {}", e))
    })?;
    let output = output.trim();
    if output.is_empty() {
        return Err(Error::external_tool(
            Some(0),
            "yt-dlp produced no metadata output",
        ));
    }

    let value: Value = serde_json::from_str(output).map_err(|e| {
        Error::external_tool(Some(0), format!("failed to parse video info: {}", e))
    })?;

    project_metadata(&value)
}

/// Project a yt-dlp info document onto [`VideoMetadata`]
pub fn project_metadata(info: &Value) -> Result<VideoMetadata> {
    if !info.is_object() {
        return Err(Error::external_tool(
            Some(0),
            "failed to parse video info: expected a JSON object",
        ));
    }

    let tracks = info
        .get("formats")
        .and_then(Value::as_array)
        .map(|formats| formats.iter().map(project_track).collect())
        .unwrap_or_default();

    Ok(VideoMetadata {
        id: string_field(info, "id").unwrap_or_default(),
        title: string_field(info, "title").unwrap_or_default(),
        description: string_field(info, "description"),
        thumbnail_url: string_field(info, "thumbnail"),
        duration_seconds: info.get("duration").and_then(Value::as_f64),
        channel: string_field(info, "uploader").or_else(|| string_field(info, "channel")),
        tracks,
    })
}

fn project_track(format: &Value) -> TrackInfo {
    TrackInfo {
        track_id: string_field(format, "format_id"),
        container: string_field(format, "ext"),
        resolution: string_field(format, "resolution"),
        size_bytes: size_field(format, "filesize").or_else(|| size_field(format, "filesize_approx")),
        note: string_field(format, "format_note"),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn size_field(value: &Value, key: &str) -> Option<u64> {
    let field = value.get(key)?;
    field
        .as_u64()
        .or_else(|| field.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}
