//! Session protocol handler
//!
//! One [`SessionHandler`] exists per connected client. It parses incoming
//! [`ClientCommand`]s, runs at most one download job at a time, and pushes
//! [`ServerEvent`]s onto an unbounded channel that the transport (WebSocket)
//! drains. Events for one job always arrive as `video_info`, zero or more
//! `progress`, then exactly one `complete` or `error`.
//!
//! Jobs run on their own task, so `clearHistory` is answered while a download
//! is in flight. A job outlives a closed connection: the subprocess runs to
//! exit and the history record is still written; only the events are lost.

mod job;

use crate::catalog::FormatCatalog;
use crate::config::BusyPolicy;
use crate::error::Error;
use crate::extractor::MediaExtractor;
use crate::history::HistoryStore;
use crate::types::{ClientCommand, DownloadJob, DownloadRequest, ServerEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

pub use job::SessionState;
use job::{JobSlot, run_supervised};

/// Sending half of a session's outbound event stream
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Receiving half of a session's outbound event stream
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Shared services every session works against
#[derive(Clone)]
pub struct SessionContext {
    /// Metadata fetcher and download executor
    pub extractor: Arc<dyn MediaExtractor>,
    /// History store shared by all sessions
    pub history: Arc<dyn HistoryStore>,
    /// Format catalog used to label history records
    pub catalog: Arc<FormatCatalog>,
    /// What to do with a download command while one is running
    pub busy_policy: BusyPolicy,
}

/// Per-connection protocol state machine
pub struct SessionHandler {
    id: u64,
    context: SessionContext,
    events: EventSender,
    slot: Arc<JobSlot>,
    queue: Option<mpsc::UnboundedSender<DownloadRequest>>,
}

impl SessionHandler {
    /// Open a session; returns the handler and the stream of events for the client
    ///
    /// Must be called from within a Tokio runtime when the busy policy is
    /// [`BusyPolicy::Queue`], since the queue worker is spawned here.
    pub fn open(context: SessionContext) -> (Self, EventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::new(JobSlot::default());

        let queue = match context.busy_policy {
            BusyPolicy::Reject => None,
            BusyPolicy::Queue => {
                let (tx, mut rx) = mpsc::unbounded_channel::<DownloadRequest>();
                let context = context.clone();
                let events = events.clone();
                let slot = slot.clone();
                tokio::spawn(async move {
                    while let Some(request) = rx.recv().await {
                        let job = DownloadJob::new(&request.url, &request.format);
                        if let Some(claim) = JobSlot::try_claim(&slot, job) {
                            run_supervised(id, context.clone(), events.clone(), claim, request)
                                .await;
                        }
                    }
                    tracing::debug!(session = id, "download queue closed");
                });
                Some(tx)
            }
        };

        tracing::info!(session = id, policy = ?context.busy_policy, "session opened");

        (
            Self {
                id,
                context,
                events,
                slot,
                queue,
            },
            receiver,
        )
    }

    /// Session identifier used in logs
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current state of the job track
    pub fn state(&self) -> SessionState {
        self.slot.state()
    }

    /// Snapshot of the job in flight, if any
    pub fn current_job(&self) -> Option<DownloadJob> {
        self.slot.snapshot()
    }

    /// Handle one raw text frame from the client
    ///
    /// Frames that are not a valid command produce an `error` event without a
    /// `step`; the session stays usable.
    pub async fn handle_message(&self, raw: &str) {
        match serde_json::from_str::<ClientCommand>(raw) {
            Ok(command) => self.handle_command(command).await,
            Err(e) => {
                tracing::warn!(session = self.id, error = %e, "malformed session command");
                self.send(ServerEvent::error(
                    Error::Validation(format!("malformed command: {}", e)).to_string(),
                ));
            }
        }
    }

    /// Handle one parsed command
    pub async fn handle_command(&self, command: ClientCommand) {
        match command {
            ClientCommand::Download { data } => self.start_download(data),
            ClientCommand::ClearHistory => self.clear_history().await,
        }
    }

    fn start_download(&self, request: DownloadRequest) {
        if let Err(e) = request.validate() {
            tracing::warn!(session = self.id, error = %e, "rejected download command");
            self.send(ServerEvent::error(e.to_string()));
            return;
        }

        if let Some(queue) = &self.queue {
            tracing::debug!(session = self.id, url = %request.url, "download queued");
            if queue.send(request).is_err() {
                self.send(ServerEvent::error("download queue is closed"));
            }
            return;
        }

        let job = DownloadJob::new(&request.url, &request.format);
        let Some(claim) = JobSlot::try_claim(&self.slot, job) else {
            tracing::warn!(session = self.id, url = %request.url, "download rejected, session busy");
            self.send(ServerEvent::error(Error::SessionBusy.to_string()));
            return;
        };

        tokio::spawn(run_supervised(
            self.id,
            self.context.clone(),
            self.events.clone(),
            claim,
            request,
        ));
    }

    async fn clear_history(&self) {
        match self.context.history.clear_all().await {
            Ok(removed) => {
                tracing::info!(session = self.id, removed, "download history cleared");
                self.send(ServerEvent::HistoryCleared);
            }
            Err(e) => {
                tracing::error!(session = self.id, error = %e, "failed to clear history");
                self.send(ServerEvent::error(format!("Failed to clear history: {}", e)));
            }
        }
    }

    fn send(&self, event: ServerEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(session = self.id, "event dropped, client gone");
        }
    }
}

impl Drop for SessionHandler {
    fn drop(&mut self) {
        tracing::info!(session = self.id, state = ?self.slot.state(), "session closed");
    }
}
