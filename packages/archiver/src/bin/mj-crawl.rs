//! Archive Midjourney job metadata
//!
//! Pages through the recent-jobs listing and stores, per job, the raw JSON
//! record and a plain-text prompt summary under a date-partitioned tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use archiver::{CrawlOptions, CrawlReport, Crawler, Credentials, MetadataWriter};
use clap::Parser;
use midjourney_client::{JobTypeFilter, MidjourneyClient, DEFAULT_PAGE_SIZE};

#[derive(Parser)]
#[command(name = "mj-crawl")]
#[command(about = "Archive Midjourney job metadata and prompts")]
struct Cli {
    /// Root of the date-partitioned archive
    #[arg(long, default_value = "mj-archive")]
    archive_root: PathBuf,

    /// Maximum number of listing pages to fetch (default: until exhausted)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    limit: Option<u32>,

    /// Job type to list, or `any` for all types
    #[arg(long, default_value = "upscale")]
    job_type: JobTypeFilter,

    /// Explicit `fromDate` cursor, e.g. "2023-04-01 12:00:00.000000"
    #[arg(long)]
    from_date: Option<String>,

    /// Jobs per listing page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    archiver::logging::init();
    let cli = Cli::parse();

    let credentials = Credentials::load().context("Failed to load credentials")?;
    let client = MidjourneyClient::new(credentials.user_id, credentials.session_token);
    let crawler = Crawler::new(client, MetadataWriter::new(&cli.archive_root));

    let options = CrawlOptions {
        limit: cli.limit,
        job_type: cli.job_type,
        from_date: cli.from_date,
        page_size: cli.page_size,
    };
    tracing::info!(archive_root = %cli.archive_root.display(), ?options, "Starting crawl");

    let mut report = CrawlReport::default();
    tokio::select! {
        result = crawler.crawl(&options, &mut report) => result.context("Crawl failed")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Caught interrupt"),
    }

    tracing::info!(%report, "Crawling stats");
    Ok(())
}
