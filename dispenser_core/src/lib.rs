#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Supervisory core for the dispensing appliance (transport-agnostic).
//!
//! This crate holds the device-liveness and command-dispatch core. All
//! controller I/O goes through the `dispenser_traits::ControllerLink` trait.
//!
//! ## Architecture
//!
//! - **Liveness**: staleness-windowed reachability from heartbeats or
//!   probes (`liveness` module), fed by the background `poller`
//! - **Dispatch**: liveness-gated, best-effort command forwarding
//!   (`dispatch` module)
//! - **Sessions**: lifecycle orchestration over the persisted event log
//!   (`controller` module)
//! - **History**: pure rendering of log rows for operators (`history`
//!   module)

pub mod controller;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod liveness;
pub mod mocks;
pub mod poller;

pub use controller::{DEFAULT_STOP_REASON, SessionController, StartReceipt};
pub use dispatch::{CommandDispatcher, CommandOutcome};
pub use error::{DispenseError, Result};
pub use history::{EventKind, HistoryEvent, render_event};
pub use liveness::{ControllerLiveness, LivenessSnapshot};
pub use poller::{PollerHandle, spawn_poller};
