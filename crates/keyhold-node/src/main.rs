//! Keyhold Node - credential enrollment and login over HTTP.

use anyhow::Context;
use clap::Parser;
use keyhold_node::api::{create_router, AppState};
use keyhold_node::config::Config;
use keyhold_node::observability::{init_logging, LogFormat};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Keyhold Node - credential issuance and verification service
#[derive(Parser, Debug)]
#[command(name = "keyhold-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "keyhold.yaml")]
    config: PathBuf,

    /// API listen address (overrides the configuration file)
    #[arg(long)]
    api_addr: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(Some(&args.config))
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(addr) = args.api_addr {
        config.api_addr = addr;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if args.json_logs {
        config.log_format = "json".to_string();
    }

    init_logging(&config.log_level, LogFormat::parse(&config.log_format));

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Keyhold node");
    tracing::info!(
        api_addr = %config.api_addr,
        work_factor = config.hasher.work_factor,
        memory_kib = config.hasher.memory_kib,
        "Node configuration"
    );

    let state = AppState::new(config.hasher).context("initializing credential service")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.api_addr)
        .await
        .with_context(|| format!("binding {}", config.api_addr))?;

    tracing::info!("Node is ready. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("Keyhold node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
