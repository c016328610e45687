use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use picos_server::{serve, AppConfig, ServerState};

#[derive(Debug, Parser)]
#[command(name = "picos-server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "picos.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .try_init();

    let args = Args::parse();
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("load configuration from {}", args.config.display()))?;
    let bind_addr = config.bind_addr();

    let state = Arc::new(ServerState::new(config));
    if let Err(err) = state.gateway.health_check().await {
        tracing::warn!(
            gateway = state.gateway.name(),
            model = state.gateway.model(),
            error = %err,
            "model gateway health check failed; analysis calls may not succeed"
        );
    } else {
        tracing::info!(
            gateway = state.gateway.name(),
            model = state.gateway.model(),
            "model gateway is reachable"
        );
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("bind server listener on {}", bind_addr))?;
    tracing::info!(%bind_addr, "picos-server listening");
    serve(listener, state).await.context("server terminated")
}
