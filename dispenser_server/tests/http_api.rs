use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use dispenser_core::mocks::ScriptedLink;
use dispenser_core::{CommandDispatcher, ControllerLiveness, SessionController};
use dispenser_server::server::build_router;
use dispenser_server::state::AppState;
use dispenser_store::EventLog;
use dispenser_traits::MonotonicClock;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct Rig {
    router: Router,
    liveness: Arc<ControllerLiveness>,
    link: Arc<ScriptedLink>,
}

fn rig() -> Rig {
    let store = Arc::new(EventLog::in_memory().expect("open store"));
    let liveness = Arc::new(ControllerLiveness::new(
        Duration::from_secs(10),
        Arc::new(MonotonicClock::new()),
    ));
    let link = Arc::new(ScriptedLink::new());
    let dispatcher = CommandDispatcher::new(link.clone(), liveness.clone());
    let controller = Arc::new(SessionController::new(store, liveness.clone(), dispatcher));
    let router = build_router(AppState::new(controller, liveness.clone()));
    Rig {
        router,
        liveness,
        link,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("build request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    };
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON body")
    };
    (status, value)
}

#[tokio::test]
async fn health_answers_ok() {
    let rig = rig();
    let (status, body) = send(&rig.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn dispense_while_disconnected_is_503_with_empty_history() {
    let rig = rig();
    let (status, body) = send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 250, "syrup": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "controller not connected");

    let (status, history) = send(&rig.router, "GET", "/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn full_dispense_lifecycle_over_http() {
    let rig = rig();

    // Heartbeat connects the controller.
    let (status, body) = send(&rig.router, "POST", "/controller/heartbeat", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 250, "syrup": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "started");
    assert!(body.get("message").is_none());

    let (status, body) = send(
        &rig.router,
        "POST",
        "/update-progress",
        Some(json!({"water_dispensed": 100, "syrup_dispensed": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "updated");

    let (status, body) = send(&rig.router, "POST", "/complete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (status, history) = send(&rig.router, "GET", "/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let events = history.as_array().expect("history array");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "DISPENSE");
    assert_eq!(events[0]["message"], "Completed | Water: 250 ml, Syrup: 50 ml");
    assert!(events[0]["id"].is_i64());
    assert!(events[0]["timestamp"].is_string());
}

#[tokio::test]
async fn second_dispense_while_active_is_409() {
    let rig = rig();
    rig.liveness.mark_seen();

    let (status, _) = send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 100, "syrup": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 200, "syrup": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn dispense_reports_command_failure_without_failing() {
    let rig = rig();
    rig.liveness.mark_seen();
    rig.link.set_accept_commands(false);

    let (status, body) = send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 100, "syrup": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "started");
    let message = body["message"].as_str().expect("failure message");
    assert!(message.starts_with("start command failed:"));
}

#[tokio::test]
async fn negative_volume_is_400() {
    let rig = rig();
    rig.liveness.mark_seen();

    let (status, body) = send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": -1, "syrup": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn update_progress_defaults_to_zero_and_tolerates_no_body() {
    let rig = rig();
    let (status, body) = send(&rig.router, "POST", "/update-progress", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "updated");

    let (status, _) = send(&rig.router, "POST", "/update-progress", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn emergency_stop_records_reason_and_reports_command_result() {
    let rig = rig();
    rig.liveness.mark_seen();
    send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 250, "syrup": 50})),
    )
    .await;
    send(
        &rig.router,
        "POST",
        "/update-progress",
        Some(json!({"water_dispensed": 80, "syrup_dispensed": 12})),
    )
    .await;

    rig.link.set_accept_commands(false);
    let (status, body) = send(
        &rig.router,
        "POST",
        "/emergency-stop",
        Some(json!({"reason": "leak detected"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["command_result"]["ok"], false);

    let (_, history) = send(&rig.router, "GET", "/history", None).await;
    let events = history.as_array().expect("history array");
    assert_eq!(events[0]["type"], "EMERGENCY");
    assert_eq!(
        events[0]["message"],
        "Emergency Stop | Dispensed Water: 80/250 ml, Syrup: 12/50 ml | Reason: leak detected"
    );
}

#[tokio::test]
async fn emergency_stop_without_body_uses_default_reason() {
    let rig = rig();
    rig.liveness.mark_seen();
    send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 100, "syrup": 10})),
    )
    .await;

    let (status, body) = send(&rig.router, "POST", "/emergency-stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["command_result"]["ok"], true);

    let (_, history) = send(&rig.router, "GET", "/history", None).await;
    let message = history[0]["message"].as_str().expect("message");
    assert!(message.contains("Reason: Emergency stop pressed"));
}

#[tokio::test]
async fn clear_history_empties_the_log() {
    let rig = rig();
    rig.liveness.mark_seen();
    send(
        &rig.router,
        "POST",
        "/dispense",
        Some(json!({"water": 100, "syrup": 10})),
    )
    .await;
    send(&rig.router, "POST", "/complete", None).await;

    let (status, body) = send(&rig.router, "POST", "/clear-history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cleared");

    let (_, history) = send(&rig.router, "GET", "/history", None).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn delete_history_is_idempotent() {
    let rig = rig();
    let (status, body) = send(&rig.router, "DELETE", "/delete-history/999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");
}

#[tokio::test]
async fn controller_status_follows_liveness() {
    let rig = rig();

    let (status, body) = send(&rig.router, "GET", "/controller/status", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "controller not connected");

    send(&rig.router, "POST", "/controller/heartbeat", None).await;
    let (status, body) = send(&rig.router, "GET", "/controller/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "connected");
}
