//! Dispense lifecycle orchestration.
//!
//! Composes the event log, the liveness tracker, and the command dispatcher
//! into the four request-facing operations. Per session the state machine is
//! IN_PROGRESS -> COMPLETED or IN_PROGRESS -> EMERGENCY_STOP, both terminal;
//! a terminal transition with no active row is ignored, not an error.

use crate::dispatch::{CommandDispatcher, CommandOutcome};
use crate::error::{DispenseError, Result};
use crate::history::{HistoryEvent, render_event};
use crate::liveness::ControllerLiveness;
use dispenser_store::EventLog;
use dispenser_traits::ControllerCommand;
use std::sync::Arc;

/// Reason recorded when a stop request carries none.
pub const DEFAULT_STOP_REASON: &str = "Emergency stop pressed";

/// What a start request returns: the created session plus the command
/// outcome, reported separately.
#[derive(Debug, Clone)]
pub struct StartReceipt {
    pub session_id: i64,
    pub command: CommandOutcome,
}

pub struct SessionController {
    store: Arc<EventLog>,
    liveness: Arc<ControllerLiveness>,
    dispatcher: CommandDispatcher,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController").finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(
        store: Arc<EventLog>,
        liveness: Arc<ControllerLiveness>,
        dispatcher: CommandDispatcher,
    ) -> Self {
        Self {
            store,
            liveness,
            dispatcher,
        }
    }

    /// Start a dispense cycle.
    ///
    /// Fails without a log entry when the controller is unreachable. A
    /// dispatch failure after the session row exists does not roll it back;
    /// the session stays IN_PROGRESS and the receipt carries the failure.
    pub async fn start_dispense(&self, water_ml: f64, syrup_ml: f64) -> Result<StartReceipt> {
        validate_volume(water_ml)?;
        validate_volume(syrup_ml)?;
        if !self.liveness.is_connected() {
            return Err(DispenseError::DeviceUnavailable);
        }

        let session_id = self.store.create_session(water_ml, syrup_ml)?;
        let command = self
            .dispatcher
            .send(ControllerCommand::Start { water_ml, syrup_ml })
            .await;
        if command.ok {
            tracing::info!(session_id, water_ml, syrup_ml, "dispense started");
        } else {
            tracing::warn!(
                session_id,
                detail = %command.detail,
                "start command not accepted; session left in progress"
            );
        }
        Ok(StartReceipt {
            session_id,
            command,
        })
    }

    /// Record last-reported progress; succeeds even with no active session.
    pub fn update_progress(&self, water_ml: f64, syrup_ml: f64) -> Result<()> {
        self.store.update_progress(water_ml, syrup_ml)?;
        Ok(())
    }

    /// Emergency stop: the stop command goes out regardless of its outcome,
    /// and the active session (if any) is marked stopped either way.
    pub async fn emergency_stop(&self, reason: Option<String>) -> Result<CommandOutcome> {
        let command = self.dispatcher.send(ControllerCommand::Stop).await;
        let reason = reason.unwrap_or_else(|| DEFAULT_STOP_REASON.to_string());
        self.store.mark_emergency_stop(&reason)?;
        tracing::warn!(reason = %reason, command_ok = command.ok, "emergency stop");
        Ok(command)
    }

    /// Mark the active session completed; the controller is not contacted.
    pub fn complete_dispense(&self) -> Result<()> {
        self.store.mark_completed()?;
        Ok(())
    }

    /// Rendered history, most-recent session first.
    pub fn history(&self) -> Result<Vec<HistoryEvent>> {
        let sessions = self.store.list_history()?;
        Ok(sessions.iter().map(render_event).collect())
    }

    /// Delete all history records unconditionally.
    pub fn clear_history(&self) -> Result<()> {
        self.store.clear_history()?;
        Ok(())
    }

    /// Delete one history record; missing ids are a success.
    pub fn delete_session(&self, id: i64) -> Result<()> {
        self.store.delete_session(id)?;
        Ok(())
    }
}

fn validate_volume(ml: f64) -> Result<()> {
    if !ml.is_finite() {
        return Err(DispenseError::InvalidTarget("volume must be finite"));
    }
    if ml < 0.0 {
        return Err(DispenseError::InvalidTarget("volume must be >= 0"));
    }
    Ok(())
}
