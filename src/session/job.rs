//! The job track of a session: slot bookkeeping and the fetch → download → record sequence

use super::{EventSender, SessionContext};
use crate::error::Error;
use crate::types::{
    DownloadJob, DownloadRequest, ErrorStep, JobState, NewHistoryRecord, ServerEvent,
};
use crate::utils::file_size;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinError;

/// Observable state of a session's job track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No job in flight
    Idle,
    /// Metadata fetch running
    AwaitingMetadata,
    /// Download subprocess running
    Downloading,
}

/// Holds the session's single in-flight job
#[derive(Debug, Default)]
pub(crate) struct JobSlot {
    job: Mutex<Option<DownloadJob>>,
}

impl JobSlot {
    fn lock(&self) -> MutexGuard<'_, Option<DownloadJob>> {
        self.job.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Install `job` if the slot is empty
    pub(crate) fn try_claim(slot: &Arc<Self>, job: DownloadJob) -> Option<ClaimedJob> {
        let mut current = slot.lock();
        if current.is_some() {
            return None;
        }
        *current = Some(job);
        Some(ClaimedJob { slot: slot.clone() })
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut DownloadJob)) {
        if let Some(job) = self.lock().as_mut() {
            f(job);
        }
    }

    pub(crate) fn snapshot(&self) -> Option<DownloadJob> {
        self.lock().clone()
    }

    pub(crate) fn state(&self) -> SessionState {
        match self.lock().as_ref().map(|job| job.state) {
            None | Some(JobState::Completed) | Some(JobState::Failed) => SessionState::Idle,
            Some(JobState::Idle) | Some(JobState::FetchingMetadata) => {
                SessionState::AwaitingMetadata
            }
            Some(JobState::Downloading) => SessionState::Downloading,
        }
    }
}

/// Ownership of the slot for one job; empties the slot when dropped
pub(crate) struct ClaimedJob {
    slot: Arc<JobSlot>,
}

impl Drop for ClaimedJob {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

/// Run one job on its own task and deliver its terminal event
///
/// The slot is released before the terminal event is sent, so a client that
/// reacts to `complete` with a new `download` is never told the session is busy.
pub(crate) async fn run_supervised(
    session: u64,
    context: SessionContext,
    events: EventSender,
    claim: ClaimedJob,
    request: DownloadRequest,
) {
    let task = tokio::spawn(run_job(
        session,
        context,
        events.clone(),
        claim.slot.clone(),
        request,
    ));

    let terminal = match task.await {
        Ok(event) => event,
        Err(e) => {
            let detail = join_failure_detail(e);
            tracing::error!(session, error = %detail, "download job aborted");
            claim.slot.update(|job| job.state = JobState::Failed);
            ServerEvent::step_error(
                ErrorStep::Unknown,
                format!("An unexpected error occurred: {}", detail),
            )
        }
    };

    drop(claim);
    if events.send(terminal).is_err() {
        tracing::debug!(session, "terminal event dropped, client gone");
    }
}

/// Fetch metadata, download, record history; returns the terminal event
async fn run_job(
    session: u64,
    context: SessionContext,
    events: EventSender,
    slot: Arc<JobSlot>,
    request: DownloadRequest,
) -> ServerEvent {
    let DownloadRequest { url, format } = request;

    slot.update(|job| job.state = JobState::FetchingMetadata);
    tracing::info!(session, url = %url, "fetching video info");

    let metadata = match context.extractor.fetch_metadata(&url).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(session, url = %url, error = %e, "video info fetch failed");
            slot.update(|job| job.state = JobState::Failed);
            return ServerEvent::step_error(
                ErrorStep::VideoInfo,
                format!("Failed to fetch video information: {}", describe(&e)),
            );
        }
    };
    tracing::info!(session, title = %metadata.title, "fetched video info");

    if events
        .send(ServerEvent::VideoInfo {
            video_info: metadata.clone(),
        })
        .is_err()
    {
        tracing::debug!(session, "video info event dropped, client gone");
    }

    slot.update(|job| job.state = JobState::Downloading);
    tracing::info!(session, format = %format, "starting download");

    let progress = |percent: f64| {
        slot.update(|job| job.record_progress(percent));
        if events
            .send(ServerEvent::Progress { progress: percent })
            .is_err()
        {
            tracing::debug!(session, progress = percent, "progress event dropped, client gone");
        }
    };

    let outcome = match context.extractor.download(&url, &format, &progress).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(session, url = %url, error = %e, "download failed");
            slot.update(|job| job.state = JobState::Failed);
            return ServerEvent::step_error(
                ErrorStep::Download,
                format!("Download failed: {}", describe(&e)),
            );
        }
    };
    tracing::info!(session, file = %outcome.file_name, "download completed");

    let record = NewHistoryRecord {
        url,
        title: metadata.title,
        thumbnail_url: metadata.thumbnail_url,
        format_label: context.catalog.label_for(&format),
        selector: format,
        duration_seconds: metadata.duration_seconds,
        file_size_bytes: file_size(&outcome.stored_path).await,
        file_name: outcome.file_name.clone(),
        stored_path: outcome.stored_path.to_string_lossy().into_owned(),
    };

    // History failures never block the completion event
    match context.history.insert(record).await {
        Ok(stored) => {
            tracing::info!(session, id = stored.id, store = context.history.name(), "added to download history")
        }
        Err(e) => tracing::warn!(session, error = %e, "failed to record download history"),
    }

    slot.update(|job| job.complete(&outcome));

    ServerEvent::Complete {
        file_name: outcome.file_name,
        download_path: outcome.stored_path.to_string_lossy().into_owned(),
    }
}

/// Client-facing text for a job failure
fn describe(error: &Error) -> String {
    match error {
        Error::ExternalTool { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn join_failure_detail(error: JoinError) -> String {
    if !error.is_panic() {
        return "job was cancelled".into();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "job panicked".into()
    }
}
