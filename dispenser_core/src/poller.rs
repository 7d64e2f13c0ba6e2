//! Background liveness polling.
//!
//! Spawns a task that owns a `ControllerLink` probe loop and feeds the
//! shared `ControllerLiveness`. The task runs from service init until the
//! shutdown signal; each probe is time-bounded by the link itself, so a
//! hung controller delays at most one tick.

use crate::liveness::ControllerLiveness;
use dispenser_traits::ControllerLink;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle to the polling task; shut down at process exit.
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal the loop and wait for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(?e, "liveness poller panicked during shutdown");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        // Handle dropped without an explicit shutdown: stop the loop so the
        // task does not outlive its owner.
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start probing `link` every `interval`, updating `liveness` after each
/// attempt. Success marks the controller seen; any failure (non-success
/// response, timeout, connection error) marks it unreachable.
pub fn spawn_poller(
    link: Arc<dyn ControllerLink>,
    liveness: Arc<ControllerLiveness>,
    interval: Duration,
) -> PollerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match link.ping().await {
                        Ok(()) => liveness.mark_seen(),
                        Err(e) => {
                            tracing::debug!(error = %e, "liveness probe failed");
                            liveness.mark_unreachable();
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    tracing::debug!("liveness poller received shutdown signal");
                    break;
                }
            }
        }
        tracing::trace!("liveness poller exiting cleanly");
    });

    PollerHandle {
        shutdown_tx,
        task: Some(task),
    }
}
