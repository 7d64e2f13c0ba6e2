use dispenser_core::ControllerLiveness;
use dispenser_traits::clock::test_clock::TestClock;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const STALE: Duration = Duration::from_secs(10);

fn tracker() -> (ControllerLiveness, TestClock) {
    let clock = TestClock::new();
    let tracker = ControllerLiveness::new(STALE, Arc::new(clock.clone()));
    (tracker, clock)
}

#[test]
fn starts_disconnected() {
    let (tracker, _clock) = tracker();
    assert!(!tracker.is_connected());
    assert!(tracker.snapshot().last_seen.is_none());
}

#[test]
fn heartbeat_connects_until_threshold() {
    let (tracker, clock) = tracker();

    tracker.mark_seen();
    assert!(tracker.is_connected());

    // Any query strictly before T + threshold sees connected.
    clock.advance(STALE - Duration::from_millis(1));
    assert!(tracker.is_connected());

    // At the threshold the signal is stale.
    clock.advance(Duration::from_millis(1));
    assert!(!tracker.is_connected());
}

#[test]
fn fresh_heartbeat_restarts_the_window() {
    let (tracker, clock) = tracker();

    tracker.mark_seen();
    clock.advance(Duration::from_secs(9));
    tracker.mark_seen();
    clock.advance(Duration::from_secs(9));
    assert!(tracker.is_connected());

    clock.advance(Duration::from_secs(2));
    assert!(!tracker.is_connected());
}

#[test]
fn mark_unreachable_disconnects_immediately() {
    let (tracker, _clock) = tracker();
    tracker.mark_seen();
    assert!(tracker.is_connected());

    tracker.mark_unreachable();
    assert!(!tracker.is_connected());

    // A later successful probe reconnects.
    tracker.mark_seen();
    assert!(tracker.is_connected());
}

#[test]
fn observers_fire_on_transitions_only() {
    let (tracker, clock) = tracker();
    let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    tracker.on_change(move |connected| {
        sink.lock().expect("hook lock").push(connected);
    });

    tracker.mark_seen();
    tracker.mark_seen(); // already connected: no event
    assert!(tracker.is_connected()); // still fresh: no event

    clock.advance(STALE + Duration::from_secs(1));
    assert!(!tracker.is_connected()); // staleness crossing: one event
    assert!(!tracker.is_connected()); // already disconnected: no event

    tracker.mark_seen();
    assert_eq!(*seen.lock().expect("hook lock"), vec![true, false, true]);
}

#[test]
fn snapshot_reports_staleness() {
    let (tracker, clock) = tracker();
    tracker.mark_seen();

    let snap = tracker.snapshot();
    assert!(snap.connected);
    assert!(snap.last_seen.is_some());

    clock.advance(STALE + Duration::from_secs(1));
    let snap = tracker.snapshot();
    assert!(!snap.connected);
    // last_seen is history, not cleared by staleness.
    assert!(snap.last_seen.is_some());
}
