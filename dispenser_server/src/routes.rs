//! Request handlers for the supervisory HTTP surface.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dispenser_core::{CommandOutcome, HistoryEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DispenseRequest {
    pub water: f64,
    pub syrup: f64,
}

#[derive(Debug, Serialize)]
pub struct DispenseResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Start a dispense cycle. 503 when the controller is unreachable; a
/// command failure after the session exists is reported in `message`
/// without failing the request.
pub async fn dispense(
    State(state): State<AppState>,
    Json(req): Json<DispenseRequest>,
) -> Result<Json<DispenseResponse>, ApiError> {
    let receipt = state.controller.start_dispense(req.water, req.syrup).await?;
    let message = (!receipt.command.ok)
        .then(|| format!("start command failed: {}", receipt.command.detail));
    Ok(Json(DispenseResponse {
        status: "started",
        message,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgressRequest {
    pub water_dispensed: f64,
    pub syrup_dispensed: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Record last-reported progress; both body and fields are optional and
/// default to zero. No-op when no session is active.
pub async fn update_progress(
    State(state): State<AppState>,
    body: Option<Json<ProgressRequest>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    state
        .controller
        .update_progress(req.water_dispensed, req.syrup_dispensed)?;
    Ok(Json(StatusResponse { status: "updated" }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StopRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub ok: bool,
    pub detail: String,
}

impl From<CommandOutcome> for CommandResult {
    fn from(outcome: CommandOutcome) -> Self {
        Self {
            ok: outcome.ok,
            detail: outcome.detail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub status: &'static str,
    pub command_result: CommandResult,
}

/// Emergency stop. Always answers 200: the emergency state is recorded
/// whether or not the stop command reached the controller, and the
/// command outcome rides along in the body.
pub async fn emergency_stop(
    State(state): State<AppState>,
    body: Option<Json<StopRequest>>,
) -> Result<Json<StopResponse>, ApiError> {
    let reason = body.and_then(|Json(b)| b.reason);
    let outcome = state.controller.emergency_stop(reason).await?;
    Ok(Json(StopResponse {
        status: "stopped",
        command_result: outcome.into(),
    }))
}

/// Mark the active session completed; the controller is not contacted.
pub async fn complete(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    state.controller.complete_dispense()?;
    Ok(Json(StatusResponse {
        status: "completed",
    }))
}

#[derive(Debug, Serialize)]
pub struct HistoryEventBody {
    pub id: i64,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

impl From<HistoryEvent> for HistoryEventBody {
    fn from(event: HistoryEvent) -> Self {
        Self {
            id: event.id,
            timestamp: event.timestamp,
            kind: event.kind.as_str(),
            message: event.message,
        }
    }
}

/// Rendered event history, most-recent session first.
pub async fn history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEventBody>>, ApiError> {
    let events = state.controller.history()?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Delete all history records.
pub async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.controller.clear_history()?;
    Ok(Json(StatusResponse { status: "cleared" }))
}

/// Delete one history record; unknown ids succeed.
pub async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.controller.delete_session(id)?;
    Ok(Json(StatusResponse { status: "deleted" }))
}

/// Passive liveness signal from the controller.
pub async fn heartbeat(State(state): State<AppState>) -> Json<StatusResponse> {
    state.liveness.mark_seen();
    Json(StatusResponse { status: "ok" })
}

/// Current controller connectivity: 200 connected, 503 otherwise.
pub async fn controller_status(State(state): State<AppState>) -> Response {
    if state.liveness.is_connected() {
        Json(StatusResponse {
            status: "connected",
        })
        .into_response()
    } else {
        ApiError::service_unavailable("controller not connected").into_response()
    }
}

/// Shallow service health check.
pub async fn health() -> (StatusCode, Json<StatusResponse>) {
    (StatusCode::OK, Json(StatusResponse { status: "ok" }))
}
