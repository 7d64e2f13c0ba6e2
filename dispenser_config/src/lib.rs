#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the dispenser supervisor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Timing knobs are plain milliseconds in the file; `ControllerCfg`
//!   exposes `Duration` accessors for the rest of the stack.
use serde::Deserialize;
use std::time::Duration;

/// How controller reachability is determined.
///
/// - `heartbeat`: the controller calls the supervisor's heartbeat endpoint;
///   staleness is evaluated on read.
/// - `poll`: a background task probes the controller's ping endpoint.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LivenessMode {
    Heartbeat,
    #[default]
    Poll,
}

/// Which controller link implementation to run.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    #[default]
    Http,
    /// Simulated link for development without the appliance on the network.
    Sim,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    /// TCP port the HTTP surface listens on.
    pub http_port: u16,
    /// Bind address.
    pub bind_addr: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            http_port: 5000,
            bind_addr: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerCfg {
    /// Controller host (IP or hostname, optionally with port).
    pub address: String,
    /// Budget for one outbound command or probe (ms).
    pub command_timeout_ms: u64,
    /// Interval between liveness probes in poll mode (ms).
    pub poll_interval_ms: u64,
    /// A heartbeat/probe older than this marks the controller disconnected (ms).
    pub stale_threshold_ms: u64,
    pub liveness: LivenessMode,
    pub mode: LinkMode,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            address: String::new(),
            command_timeout_ms: 2_000,
            poll_interval_ms: 2_000,
            stale_threshold_ms: 10_000,
            liveness: LivenessMode::default(),
            mode: LinkMode::default(),
        }
    }
}

impl ControllerCfg {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
    pub fn stale_threshold(&self) -> Duration {
        Duration::from_millis(self.stale_threshold_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageCfg {
    /// Path to the SQLite event log.
    pub db_path: String,
}

impl Default for StorageCfg {
    fn default() -> Self {
        Self {
            db_path: "history.db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerCfg,
    pub controller: ControllerCfg,
    #[serde(default)]
    pub storage: StorageCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Reject configurations that cannot run.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.server.http_port == 0 {
            eyre::bail!("server.http_port must be non-zero");
        }
        if self.server.bind_addr.trim().is_empty() {
            eyre::bail!("server.bind_addr must not be empty");
        }
        if self.controller.mode == LinkMode::Http && self.controller.address.trim().is_empty() {
            eyre::bail!("controller.address is required when controller.mode = \"http\"");
        }
        if self.controller.command_timeout_ms == 0 {
            eyre::bail!("controller.command_timeout_ms must be >= 1");
        }
        if self.controller.poll_interval_ms == 0 {
            eyre::bail!("controller.poll_interval_ms must be >= 1");
        }
        if self.controller.stale_threshold_ms == 0 {
            eyre::bail!("controller.stale_threshold_ms must be >= 1");
        }
        if self.storage.db_path.trim().is_empty() {
            eyre::bail!("storage.db_path must not be empty");
        }
        Ok(())
    }
}
