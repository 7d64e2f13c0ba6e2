//! Router construction and serve loop.

use crate::routes;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};
use eyre::WrapErr;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the full HTTP surface over the given state.
pub fn build_router(state: AppState) -> Router {
    // The appliance UI is served from another origin on the LAN.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/dispense", post(routes::dispense))
        .route("/update-progress", post(routes::update_progress))
        .route("/emergency-stop", post(routes::emergency_stop))
        .route("/complete", post(routes::complete))
        .route("/history", get(routes::history))
        .route("/clear-history", post(routes::clear_history))
        .route("/delete-history/:id", delete(routes::delete_history))
        .route("/controller/heartbeat", post(routes::heartbeat))
        .route("/controller/status", get(routes::controller_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, router: Router) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind to {addr}"))?;
    tracing::info!(%addr, "dispenser supervisor listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
