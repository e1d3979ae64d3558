//! Vigil Relay
//!
//! Forwards detection events from the annotation source to the ingestion sink.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Repositories: TCP access to the source's log and image services, HTTP access to the sink
//! - Services: Admission threshold and delivered-image tracking
//! - Scheduler: The polling loop that moves records from source to sink
//!
//! Every cycle the relay drains the source's pending records, drops those
//! below the confidence threshold, skips images it already delivered,
//! fetches the image for the rest and posts it to the sink. An image is
//! remembered as delivered only once the sink answers 201.

mod config;
mod repository;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_client::{SinkClient, SourceClient};

use crate::config::Config;
use crate::repository::{HttpSinkRepository, TcpImageRepository, TcpLogRepository};
use crate::scheduler::{RelayPoller, Repositories};
use crate::service::{ConfidenceThreshold, InMemoryDedupTracker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_relay=info,vigil_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vigil Relay");

    let config = load_config()?;
    info!(
        "Loaded configuration: relay_id={}, source={}:{}/{}, sink_url={}",
        config.relay_id, config.source_host, config.log_port, config.image_port, config.sink_url
    );

    let source = SourceClient::new(config.source_host.clone())
        .with_ports(config.log_port, config.image_port)
        .with_timeout(config.source_timeout)
        .with_max_log_read_bytes(config.max_log_read_bytes)
        .with_max_image_bytes(config.max_image_bytes);

    let sink = SinkClient::new(config.sink_url.clone(), config.sink_timeout)
        .context("Failed to build sink HTTP client")?;

    let repos = Repositories {
        logs: Arc::new(TcpLogRepository::new(source.clone())),
        images: Arc::new(TcpImageRepository::new(source)),
        sink: Arc::new(HttpSinkRepository::new(sink)),
    };

    let admission = ConfidenceThreshold::new(config.confidence_threshold);
    info!(
        "Confidence threshold: {}, log read limit: {} bytes",
        admission.threshold(),
        config.max_log_read_bytes
    );

    let mut poller = RelayPoller::new(
        &config,
        repos,
        Box::new(admission),
        Box::new(InMemoryDedupTracker::new()),
    );

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    info!("Relay initialized successfully");
    poller.run(cancel).await
}

/// Loads configuration from the environment and validates it
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Invalid relay configuration")?;
    config.validate()?;
    Ok(config)
}

/// Cancels the poller on Ctrl-C
fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
        }
    });
}
