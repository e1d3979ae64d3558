//! Log command handlers
//!
//! Reads pending detection records from the source's log service.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use vigil_client::SourceClient;
use vigil_core::domain::record::LogRecord;

use crate::config::Config;

/// Log subcommands
#[derive(Subcommand)]
pub enum LogCommands {
    /// Drain and print pending detection records
    ///
    /// The source clears its log on every read, so records shown here will
    /// not reach a running relay.
    Pending {
        /// Only request the last N records
        #[arg(long)]
        last: Option<u32>,
    },
    /// Show how many records are pending
    Count,
}

/// Handle log commands
///
/// # Arguments
/// * `command` - The log command to execute
/// * `config` - The CLI configuration
pub async fn handle_log_command(command: LogCommands, config: &Config) -> Result<()> {
    let client = config.source_client();

    match command {
        LogCommands::Pending { last } => pending_logs(&client, last).await,
        LogCommands::Count => count_logs(&client).await,
    }
}

/// Fetch and print pending records
async fn pending_logs(client: &SourceClient, last: Option<u32>) -> Result<()> {
    let records = match last {
        Some(n) => client.fetch_last_logs(n).await,
        None => client.fetch_logs().await,
    }
    .with_context(|| format!("Failed to fetch logs from {}", client.log_addr()))?;

    if records.is_empty() {
        println!("{}", "No pending detections.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} pending detection(s):", records.len()).bold()
        );
        println!();
        for record in &records {
            print_record(record);
        }
    }

    Ok(())
}

/// Print the pending record count
async fn count_logs(client: &SourceClient) -> Result<()> {
    let count = client
        .count_pending()
        .await
        .with_context(|| format!("Failed to query {}", client.log_addr()))?;

    println!("{} pending detection(s)", count.to_string().bold());
    Ok(())
}

/// Print a record summary
fn print_record(record: &LogRecord) {
    println!("  {} {}", "▸".cyan(), record.image_name.bold());
    println!("    Object:     {}", record.object_label);
    println!("    Confidence: {}", colorize_confidence(record.confidence));
    if let Some(camera) = &record.camera {
        println!("    Camera:     {}", camera.dimmed());
    }
    match (record.capture_time(), &record.captured_at) {
        (Some(time), _) => println!(
            "    Captured:   {}",
            time.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        ),
        (None, Some(raw)) => println!("    Captured:   {}", raw.dimmed()),
        (None, None) => {}
    }
    println!();
}

/// Colorize a confidence score for display
fn colorize_confidence(confidence: f64) -> ColoredString {
    let text = format!("{:.0}%", confidence * 100.0);
    if confidence >= 0.8 {
        text.green()
    } else if confidence >= 0.6 {
        text.yellow()
    } else {
        text.red()
    }
}
