#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! HTTP surface of the dispenser supervisor.
//!
//! Routes, state, and error mapping live here so integration tests can
//! drive the router without binding a port; the binary entrypoint wires
//! config, storage, the controller link, and the liveness poller around it.

pub mod cli;
pub mod error;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;
