//! Controller reachability tracking.
//!
//! A heartbeat receipt or a successful probe stamps `last_seen`; every read
//! re-evaluates staleness against the configured threshold, so a silent
//! controller flips to disconnected without any writer running. Observers
//! registered via `on_change` are notified only on transitions.

use dispenser_traits::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Point-in-time view of controller reachability.
#[derive(Debug, Clone, Copy)]
pub struct LivenessSnapshot {
    pub connected: bool,
    pub last_seen: Option<Instant>,
}

type ChangeHook = Box<dyn Fn(bool) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
struct LivenessState {
    connected: bool,
    last_seen: Option<Instant>,
}

/// Process-wide connectivity state for the one physical controller.
///
/// Mutated only through `mark_seen` / `mark_unreachable` and the staleness
/// re-evaluation inside reads; shared by reference with the command
/// dispatcher and the session controller.
pub struct ControllerLiveness {
    state: Mutex<LivenessState>,
    hooks: Mutex<Vec<ChangeHook>>,
    stale_after: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl std::fmt::Debug for ControllerLiveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerLiveness")
            .field("stale_after", &self.stale_after)
            .finish_non_exhaustive()
    }
}

impl ControllerLiveness {
    /// Starts disconnected with no liveness signal on record.
    pub fn new(stale_after: Duration, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Mutex::new(LivenessState {
                connected: false,
                last_seen: None,
            }),
            hooks: Mutex::new(Vec::new()),
            stale_after,
            clock,
        }
    }

    /// Record a confirmed liveness signal (heartbeat receipt or successful
    /// probe) and mark the controller connected.
    pub fn mark_seen(&self) {
        let now = self.clock.now();
        let flipped = {
            let Ok(mut st) = self.state.lock() else {
                return;
            };
            let flipped = !st.connected;
            st.connected = true;
            st.last_seen = Some(now);
            flipped
        };
        if flipped {
            self.notify(true);
        }
    }

    /// Record a failed probe. Keeps `last_seen` as history.
    pub fn mark_unreachable(&self) {
        let flipped = {
            let Ok(mut st) = self.state.lock() else {
                return;
            };
            let flipped = st.connected;
            st.connected = false;
            flipped
        };
        if flipped {
            self.notify(false);
        }
    }

    /// Whether the controller is currently considered reachable.
    ///
    /// Re-evaluates staleness on every call: a last signal older than the
    /// threshold flips the state to disconnected and fires observers.
    pub fn is_connected(&self) -> bool {
        let now = self.clock.now();
        let (connected, flipped) = {
            let Ok(mut st) = self.state.lock() else {
                return false;
            };
            let fresh = st
                .last_seen
                .is_some_and(|seen| now.saturating_duration_since(seen) < self.stale_after);
            let flipped = st.connected && !fresh;
            st.connected = fresh;
            (fresh, flipped)
        };
        if flipped {
            self.notify(false);
        }
        connected
    }

    /// Current state, with staleness applied.
    pub fn snapshot(&self) -> LivenessSnapshot {
        let connected = self.is_connected();
        let last_seen = self
            .state
            .lock()
            .map(|st| st.last_seen)
            .unwrap_or_default();
        LivenessSnapshot {
            connected,
            last_seen,
        }
    }

    /// Register an observer invoked with the new connectivity on each
    /// transition. Used to push status to connected UIs.
    pub fn on_change(&self, hook: impl Fn(bool) + Send + Sync + 'static) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.push(Box::new(hook));
        }
    }

    // Hooks run outside the state lock; a hook reading liveness back must
    // not deadlock.
    fn notify(&self, connected: bool) {
        tracing::info!(connected, "controller liveness changed");
        if let Ok(hooks) = self.hooks.lock() {
            for hook in hooks.iter() {
                hook(connected);
            }
        }
    }
}
