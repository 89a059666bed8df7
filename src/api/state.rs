//! Application state for the API server

use crate::{Config, MediaRelay};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The relay instance serving sessions and REST calls
    pub relay: Arc<MediaRelay>,

    /// Configuration snapshot taken when the router was built
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: Arc<MediaRelay>) -> Self {
        let config = relay.config().clone();
        Self { relay, config }
    }
}
