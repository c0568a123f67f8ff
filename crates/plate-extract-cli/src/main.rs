//! Plate Extract CLI - license-plate text extraction tool
//!
//! Command-line front end for the detection/recognition pipeline: point it
//! at an image or video, get a table of allow-listed plate text plus a CSV
//! export.

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::process::ProcessCommand;

#[derive(Parser)]
#[command(
    name = "plate-extract",
    version,
    about = "Extract Bengali license-plate text from images and videos",
    long_about = "Runs a pretrained plate detector over an uploaded image or video,\n\
                  recognizes text in each detected region, filters it against the\n\
                  fixed plate vocabulary (district names, class letters, digits),\n\
                  and writes the distinct results as a table and CSV.",
    after_help = "EXAMPLES:\n  \
                  # Process a single photo\n  \
                  plate-extract car.jpg\n\n  \
                  # Process a video, detecting on every 5th frame\n  \
                  plate-extract --frame-skip 5 dashcam.mp4\n\n  \
                  # Keep unfiltered recognizer output too\n  \
                  plate-extract --show-raw --json report.json clip.mkv"
)]
struct Cli {
    #[command(flatten)]
    command: ProcessCommand,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    cli.command.execute()
}
