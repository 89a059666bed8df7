//! CLI-based extractor driving an external yt-dlp binary

use super::parser::{ExitStatus, parse_metadata_output, tool_failure, track_download_output};
use super::traits::{ExtractorCapabilities, MediaExtractor, ProgressSink};
use crate::catalog::requests_audio_extraction;
use crate::error::{Error, Result};
use crate::types::{DownloadOutcome, VideoMetadata};
use crate::utils::validate_url;
use async_trait::async_trait;
use futures::StreamExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_stream::wrappers::SplitStream;

/// CLI-based extractor using an external yt-dlp binary
///
/// Every call spawns a fresh process; nothing is shared between calls, so
/// one instance can serve any number of concurrent sessions.
///
/// # Examples
///
/// ```no_run
/// use ytdl_relay::extractor::{CliExtractor, MediaExtractor};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let extractor = CliExtractor::new(PathBuf::from("/usr/local/bin/yt-dlp"), "downloads");
///
/// // Or auto-discover from PATH
/// let extractor = CliExtractor::from_path("downloads")
///     .expect("yt-dlp not found in PATH");
///
/// let info = extractor.fetch_metadata("https://vimeo.com/76979871").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CliExtractor {
    binary_path: PathBuf,
    download_dir: PathBuf,
    audio_format: String,
    extra_args: Vec<String>,
}

impl CliExtractor {
    /// Create a new CLI extractor with an explicit binary path
    ///
    /// # Arguments
    ///
    /// * `binary_path` - Path to the yt-dlp binary
    /// * `download_dir` - Directory downloads are written to
    pub fn new(binary_path: PathBuf, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary_path,
            download_dir: download_dir.into(),
            audio_format: "mp3".into(),
            extra_args: Vec::new(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// # Returns
    ///
    /// `Some(CliExtractor)` if the binary is found, `None` otherwise.
    pub fn from_path(download_dir: impl Into<PathBuf>) -> Option<Self> {
        which::which("yt-dlp")
            .ok()
            .map(|path| Self::new(path, download_dir))
    }

    /// Audio container used when a selector requests audio extraction
    pub fn with_audio_format(mut self, audio_format: impl Into<String>) -> Self {
        self.audio_format = audio_format.into();
        self
    }

    /// Extra arguments placed before the URL on every invocation
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Path of the binary this extractor runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Directory downloads are written to
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Run `yt-dlp --version`
    pub async fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_failure(&e))?;

        let status = ExitStatus::from(output.status);
        if !status.is_success() {
            return Err(tool_failure(
                status,
                &String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Output template for one download; `token` keeps names unique per job
    fn output_template(&self, token: i64) -> PathBuf {
        self.download_dir.join(format!("%(title)s-{}.%(ext)s", token))
    }

    fn metadata_args(&self, url: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--dump-json".into(), "--no-playlist".into()];
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(url.into());
        args
    }

    pub(crate) fn download_args(&self, url: &str, selector: &str, token: i64) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            selector.into(),
            "-o".into(),
            self.output_template(token).into_os_string(),
            "--no-playlist".into(),
            "--newline".into(),
        ];
        if requests_audio_extraction(selector) {
            args.push("--extract-audio".into());
            args.push("--audio-format".into());
            args.push(self.audio_format.clone().into());
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(url.into());
        args
    }
}

fn spawn_failure(e: &std::io::Error) -> Error {
    Error::external_tool(None, format!("failed to execute yt-dlp: {}", e))
}

#[async_trait]
impl MediaExtractor for CliExtractor {
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        validate_url(url)?;
        tracing::debug!(url, "fetching video metadata");

        let output = Command::new(&self.binary_path)
            .args(self.metadata_args(url))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| spawn_failure(&e))?;

        parse_metadata_output(
            &output.stdout,
            &output.stderr,
            ExitStatus::from(output.status),
        )
    }

    async fn download(
        &self,
        url: &str,
        selector: &str,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadOutcome> {
        validate_url(url)?;
        tokio::fs::create_dir_all(&self.download_dir).await?;

        let args = self.download_args(url, selector, chrono::Utc::now().timestamp_millis());
        tracing::info!(url, selector, "starting yt-dlp download");
        tracing::debug!(args = ?args, "yt-dlp arguments");

        let mut child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_failure(&e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::external_tool(None, "yt-dlp stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::external_tool(None, "yt-dlp stderr was not captured"))?;

        // Drained concurrently so a chatty stderr cannot stall stdout
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            BufReader::new(stderr).read_to_end(&mut buf).await.map(|_| buf)
        });

        let lines = SplitStream::new(BufReader::new(stdout).split(b'\n')).map(|line| {
            line.map(|bytes| {
                String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\r')
                    .to_string()
            })
        });

        let tracker = match track_download_output(lines, progress).await {
            Ok(tracker) => tracker,
            Err(e) => {
                let _ = child.kill().await;
                return Err(Error::Io(e));
            }
        };

        let status = child.wait().await?;
        let stderr_text = match stderr_task.await {
            Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read yt-dlp stderr");
                String::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "yt-dlp stderr reader panicked");
                String::new()
            }
        };

        let outcome = tracker.finish(ExitStatus::from(status), &stderr_text)?;
        tracing::info!(file = %outcome.file_name, "yt-dlp download finished");
        Ok(outcome)
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_fetch_metadata: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
