#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Controller link implementations.
//!
//! `HttpLink` talks to the real microcontroller over its HTTP command
//! surface (`/start`, `/stop`, `/ping`); `SimLink` is a stand-in for
//! development without the appliance on the network.

pub mod error;

pub use error::LinkError;

use async_trait::async_trait;
use dispenser_traits::{ControllerCommand, ControllerLink, LinkResult};
use std::time::Duration;

/// HTTP link to the controller. Every request shares one bounded timeout
/// so a hung controller cannot stall a caller.
pub struct HttpLink {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLink {
    /// `address` is the controller host (IP or hostname, optionally with
    /// port), as configured.
    pub fn new(address: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: format!("http://{}", address.trim_end_matches('/')),
            client,
        }
    }

    async fn get(&self, endpoint: &'static str, url: String) -> Result<(), LinkError> {
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LinkError::Status {
                endpoint,
                status: status.as_u16(),
            })
        }
    }
}

impl std::fmt::Debug for HttpLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLink")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ControllerLink for HttpLink {
    async fn command(&self, command: ControllerCommand) -> LinkResult<()> {
        let (endpoint, url) = match command {
            ControllerCommand::Start { water_ml, syrup_ml } => (
                "/start",
                format!(
                    "{}/start?water={water_ml}&syrup={syrup_ml}",
                    self.base_url
                ),
            ),
            ControllerCommand::Stop => ("/stop", format!("{}/stop", self.base_url)),
        };
        tracing::debug!(endpoint, "sending controller command");
        self.get(endpoint, url).await.map_err(|e| Box::new(e) as _)
    }

    async fn ping(&self) -> LinkResult<()> {
        self.get("/ping", format!("{}/ping", self.base_url))
            .await
            .map_err(|e| Box::new(e) as _)
    }
}

/// Simulated controller that accepts everything. Lets the rest of the
/// stack run end to end on a development machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimLink;

impl SimLink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ControllerLink for SimLink {
    async fn command(&self, command: ControllerCommand) -> LinkResult<()> {
        match command {
            ControllerCommand::Start { water_ml, syrup_ml } => {
                tracing::info!(water_ml, syrup_ml, "start command (simulated)");
            }
            ControllerCommand::Stop => {
                tracing::info!("stop command (simulated)");
            }
        }
        Ok(())
    }

    async fn ping(&self) -> LinkResult<()> {
        Ok(())
    }
}
