//! Shared application state for request handlers.

use dispenser_core::{ControllerLiveness, SessionController};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub liveness: Arc<ControllerLiveness>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(controller: Arc<SessionController>, liveness: Arc<ControllerLiveness>) -> Self {
        Self {
            controller,
            liveness,
        }
    }
}
