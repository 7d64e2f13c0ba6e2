//! Binary entrypoint: config load, wiring, and the serve loop.

use clap::Parser;
use dispenser_config::{LinkMode, LivenessMode};
use dispenser_core::{CommandDispatcher, ControllerLiveness, SessionController, spawn_poller};
use dispenser_link::{HttpLink, SimLink};
use dispenser_server::cli::Cli;
use dispenser_server::state::AppState;
use dispenser_server::{logging, server};
use dispenser_store::EventLog;
use dispenser_traits::{ControllerLink, MonotonicClock};
use eyre::{Result, WrapErr};
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let content = fs::read_to_string(&args.config)
        .wrap_err_with(|| format!("failed to read config file {}", args.config.display()))?;
    let cfg = dispenser_config::load_toml(&content).wrap_err("failed to parse config TOML")?;
    cfg.validate().wrap_err("invalid configuration")?;

    let level = args
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    logging::init(level, args.json, &cfg.logging);

    let store = Arc::new(
        EventLog::open(&cfg.storage.db_path)
            .wrap_err_with(|| format!("failed to open event log at {}", cfg.storage.db_path))?,
    );

    let link: Arc<dyn ControllerLink> = match cfg.controller.mode {
        LinkMode::Http => {
            tracing::info!(address = %cfg.controller.address, "using HTTP controller link");
            Arc::new(HttpLink::new(
                &cfg.controller.address,
                cfg.controller.command_timeout(),
            ))
        }
        LinkMode::Sim => {
            tracing::warn!("using simulated controller link; no appliance will move");
            Arc::new(SimLink::new())
        }
    };

    let liveness = Arc::new(ControllerLiveness::new(
        cfg.controller.stale_threshold(),
        Arc::new(MonotonicClock::new()),
    ));
    let dispatcher = CommandDispatcher::new(Arc::clone(&link), Arc::clone(&liveness));
    let controller = Arc::new(SessionController::new(
        Arc::clone(&store),
        Arc::clone(&liveness),
        dispatcher,
    ));

    let poller = match cfg.controller.liveness {
        LivenessMode::Poll => Some(spawn_poller(
            Arc::clone(&link),
            Arc::clone(&liveness),
            cfg.controller.poll_interval(),
        )),
        LivenessMode::Heartbeat => {
            tracing::info!("passive liveness: expecting controller heartbeats");
            None
        }
    };

    let router = server::build_router(AppState::new(controller, liveness));
    let addr: SocketAddr = format!("{}:{}", cfg.server.bind_addr, cfg.server.http_port)
        .parse()
        .wrap_err("invalid bind address")?;
    let outcome = server::serve(addr, router).await;

    if let Some(poller) = poller {
        poller.shutdown().await;
    }
    outcome
}
