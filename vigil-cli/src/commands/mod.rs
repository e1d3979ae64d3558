//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod images;
mod logs;

pub use images::ImageCommands;
pub use logs::LogCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Detection log service
    Logs {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Image service
    Images {
        #[command(subcommand)]
        command: ImageCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Logs { command } => logs::handle_log_command(command, config).await,
        Commands::Images { command } => images::handle_image_command(command, config).await,
    }
}
