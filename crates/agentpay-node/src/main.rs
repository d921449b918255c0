//! # AgentPay Node
//!
//! Pay-per-task agent job service with an HTTP API.

use clap::Parser as _;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod orchestrator;
mod state;
#[cfg(test)]
mod testing;

use config::NodeConfig;
use state::AppState;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run the node server.
pub async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let state = AppState::from_config(&config)?;

    let terms = state.orchestrator.terms();
    info!(
        seller = %terms.destination_address,
        price = terms.required_amount,
        ledger = ?config.ledger.backend,
        executor = ?config.executor.backend,
        "AgentPay node starting"
    );

    // Evict stale jobs in the background
    state.spawn_sweeper();

    let app = api::router(state);

    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AgentPay node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl+c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();
    let config = NodeConfig::parse();
    run_server(config).await
}
