// ABOUTME: Main server binary for the Ghiraas agent backend
// ABOUTME: Loads configuration, builds resources, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! Ghiraas agent server entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ghiraas_agent_server::config::ServerConfig;
use ghiraas_agent_server::logging;
use ghiraas_agent_server::resources::ServerResources;
use ghiraas_agent_server::routes;

#[derive(Parser)]
#[command(
    name = "ghiraas-agent-server",
    about = "Ghiraas fitness and nutrition assistant backend",
    version
)]
struct Args {
    /// HTTP port override (defaults to HTTP_PORT or 8081)
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env().context("Failed to initialize logging")?;

    let mut config = ServerConfig::from_env().context("Failed to load configuration")?;
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    info!("Configuration loaded: {}", config.summary());

    let http_port = config.http_port;
    let resources =
        ServerResources::from_config(config).context("Failed to initialize server resources")?;

    let app = routes::router(Arc::clone(&resources));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Ghiraas agent server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
