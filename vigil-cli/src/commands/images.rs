//! Image command handlers
//!
//! Lists and downloads images from the source's image service.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use vigil_client::SourceClient;

use crate::config::Config;

/// Image subcommands
#[derive(Subcommand)]
pub enum ImageCommands {
    /// List images available at the source
    List,
    /// Download one image
    Fetch {
        /// Image name as reported in the detection log
        name: String,

        /// Output path (defaults to the image name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle image commands
///
/// # Arguments
/// * `command` - The image command to execute
/// * `config` - The CLI configuration
pub async fn handle_image_command(command: ImageCommands, config: &Config) -> Result<()> {
    let client = config.source_client();

    match command {
        ImageCommands::List => list_images(&client).await,
        ImageCommands::Fetch { name, output } => fetch_image(&client, &name, output).await,
    }
}

/// List available images
async fn list_images(client: &SourceClient) -> Result<()> {
    let names = client
        .list_images()
        .await
        .with_context(|| format!("Failed to list images at {}", client.image_addr()))?;

    if names.is_empty() {
        println!("{}", "No images available.".yellow());
    } else {
        println!("{}", format!("Found {} image(s):", names.len()).bold());
        for name in names {
            println!("  {} {}", "▸".cyan(), name);
        }
    }

    Ok(())
}

/// Fetch an image and write it to disk
async fn fetch_image(client: &SourceClient, name: &str, output: Option<PathBuf>) -> Result<()> {
    let image = client
        .fetch_image(name)
        .await
        .with_context(|| format!("Failed to fetch image {}", name))?;

    let path = output.unwrap_or_else(|| PathBuf::from(name));
    tokio::fs::write(&path, &image)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} {} ({}) -> {}",
        "✓".green(),
        name.bold(),
        format_size(image.len()),
        display_path(&path)
    );

    Ok(())
}

fn display_path(path: &Path) -> ColoredString {
    path.display().to_string().dimmed()
}

/// Human-readable byte count
fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(48_213), "47.1 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
