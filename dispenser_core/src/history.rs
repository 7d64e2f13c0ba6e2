//! Human-readable rendering of the session log.

use dispenser_store::{DispenseSession, SessionStatus};

/// Event category shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Dispense,
    Emergency,
    Info,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Dispense => "DISPENSE",
            EventKind::Emergency => "EMERGENCY",
            EventKind::Info => "INFO",
        }
    }
}

/// One rendered history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEvent {
    pub id: i64,
    pub timestamp: String,
    pub kind: EventKind,
    pub message: String,
}

/// Pure rendering of a session row. The message formats are part of the
/// external contract and must stay stable.
pub fn render_event(session: &DispenseSession) -> HistoryEvent {
    let (kind, message) = match &session.status {
        SessionStatus::InProgress => (
            EventKind::Dispense,
            format!(
                "Dispensing in progress | Water: {}/{} ml, Syrup: {}/{} ml",
                session.dispensed_water_ml,
                session.target_water_ml,
                session.dispensed_syrup_ml,
                session.target_syrup_ml
            ),
        ),
        SessionStatus::Completed => (
            EventKind::Dispense,
            format!(
                "Completed | Water: {} ml, Syrup: {} ml",
                session.target_water_ml, session.target_syrup_ml
            ),
        ),
        SessionStatus::EmergencyStop => (
            EventKind::Emergency,
            format!(
                "Emergency Stop | Dispensed Water: {}/{} ml, Syrup: {}/{} ml | Reason: {}",
                session.dispensed_water_ml,
                session.target_water_ml,
                session.dispensed_syrup_ml,
                session.target_syrup_ml,
                session.stop_reason.as_deref().unwrap_or("unspecified")
            ),
        ),
        SessionStatus::Other(_) => (EventKind::Info, "Unknown status".to_string()),
    };
    HistoryEvent {
        id: session.id,
        timestamp: session.start_time.clone(),
        kind,
        message,
    }
}
