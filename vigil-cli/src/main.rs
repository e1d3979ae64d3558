//! Vigil CLI
//!
//! Command-line interface for inspecting the annotation source the relay
//! reads from.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use vigil_core::protocol::{DEFAULT_IMAGE_PORT, DEFAULT_LOG_PORT};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Vigil detection source CLI", long_about = None)]
struct Cli {
    /// Annotation source host
    #[arg(long, env = "VIGIL_SOURCE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Log service port
    #[arg(long, env = "VIGIL_LOG_PORT", default_value_t = DEFAULT_LOG_PORT)]
    log_port: u16,

    /// Image service port
    #[arg(long, env = "VIGIL_IMAGE_PORT", default_value_t = DEFAULT_IMAGE_PORT)]
    image_port: u16,

    /// Connect/read timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        source_host: cli.host,
        log_port: cli.log_port,
        image_port: cli.image_port,
        timeout: Duration::from_secs(cli.timeout),
    };

    handle_command(cli.command, &config).await
}
