//! Best-effort command forwarding to the controller.
//!
//! Every transport outcome is folded into a `CommandOutcome`; nothing here
//! raises past its own boundary, touches the store, or retries.

use crate::liveness::ControllerLiveness;
use dispenser_traits::{ControllerCommand, ControllerLink};
use std::sync::Arc;

/// Result of one command attempt, reported to the caller as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub ok: bool,
    pub detail: String,
}

impl CommandOutcome {
    fn accepted() -> Self {
        Self {
            ok: true,
            detail: "ok".to_string(),
        }
    }

    fn rejected(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Sends start/stop commands over the link, gated on controller liveness.
pub struct CommandDispatcher {
    link: Arc<dyn ControllerLink>,
    liveness: Arc<ControllerLiveness>,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher").finish_non_exhaustive()
    }
}

impl CommandDispatcher {
    pub fn new(link: Arc<dyn ControllerLink>, liveness: Arc<ControllerLiveness>) -> Self {
        Self { link, liveness }
    }

    /// Attempt one command. When the controller is not connected, no
    /// network I/O happens and the outcome says so.
    pub async fn send(&self, command: ControllerCommand) -> CommandOutcome {
        if !self.liveness.is_connected() {
            return CommandOutcome::rejected("controller not connected");
        }
        match self.link.command(command).await {
            Ok(()) => CommandOutcome::accepted(),
            Err(e) => {
                tracing::warn!(?command, error = %e, "controller command failed");
                CommandOutcome::rejected(e.to_string())
            }
        }
    }
}
