//! Download images linked from a Midjourney metadata archive

use std::path::PathBuf;

use anyhow::{Context, Result};
use archiver::{DownloadReport, Downloader};
use clap::Parser;
use midjourney_client::ImageClient;

#[derive(Parser)]
#[command(name = "mj-download")]
#[command(about = "Download upscaled images referenced by archived job metadata")]
struct Cli {
    /// Root of the archive written by mj-crawl
    #[arg(long, default_value = "mj-archive")]
    archive_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    archiver::logging::init();
    let cli = Cli::parse();

    let downloader = Downloader::new(ImageClient::new());
    tracing::info!(archive_root = %cli.archive_root.display(), "Starting download walk");

    let mut report = DownloadReport::default();
    tokio::select! {
        result = downloader.walk_archive(&cli.archive_root, &mut report) => {
            result.context("Download walk failed")?
        }
        _ = tokio::signal::ctrl_c() => tracing::info!("Caught interrupt"),
    }

    tracing::info!(%report, "Download stats");
    Ok(())
}
