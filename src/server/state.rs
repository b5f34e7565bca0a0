// Shared handler state

use std::sync::Arc;

use crate::downloader::Orchestrator;

/// Cloned into every handler; the orchestrator itself is read-only.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
