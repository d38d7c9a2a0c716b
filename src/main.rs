// main.rs
mod color;
mod commands;
mod config;
mod devices;
mod dispatch;
mod docs;
mod error;
mod handlers;
mod metrics;
mod models;
mod utils;

#[cfg(test)]
mod testing;

use anyhow::Context;
use axum::{ServiceExt, extract::Request};
use clap::{ArgAction, Parser};
use devices::{Discovery, Extractor, MiioCli};
use dispatch::{Dispatcher, sequence::Timing};
use models::AppState;
use std::{path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// mihome - Xiaomi based smart home automation
#[derive(Debug, Parser)]
#[command(name = "mihome", version, about)]
struct Cli {
    /// Read specified config
    #[arg(short, long, env = "MIHOME_CONFIG", default_value = "mihome.yaml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = config::Settings::load(&cli.config)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    if settings.metrics.enabled {
        crate::metrics::setup_metrics(settings.metrics.port).context("setup metrics")?;
        info!("Metrics exported on port {}", settings.metrics.port);
    }

    info!("requesting list of xiaomi devices");
    let devices = Extractor::new(&settings.mi)
        .discover()
        .await
        .context("get devices")?;
    info!("found {} xiaomi devices", devices.len());

    let dispatcher = Dispatcher::new(devices, Arc::new(MiioCli::new(&settings.control)));
    for device in dispatcher.devices() {
        debug!(name = %device.name, model = %device.model, ip = %device.local_ip, bulb = device.is_bulb(), "device");
    }

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(
        dispatcher,
        Timing::from(&settings.dance),
        shutdown.clone(),
    )
    .with_api_docs(settings.server.api_docs));

    let app = handlers::app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server.address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind address: {}", e))?;

    info!("listening and serving on {}", settings.server.address);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(utils::shutdown_signal(shutdown))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
