use std::path::Path;

use async_trait::async_trait;
use midjourney_client::{ImageClient, JobRecord, MidjourneyClient, RecentJobsQuery};

// ============================================================================
// JOB SOURCE: one page of the remote listing
// ============================================================================

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch one page. An empty page ends the listing.
    async fn fetch_page(&self, query: &RecentJobsQuery) -> midjourney_client::Result<Vec<JobRecord>>;
}

#[async_trait]
impl JobSource for MidjourneyClient {
    async fn fetch_page(&self, query: &RecentJobsQuery) -> midjourney_client::Result<Vec<JobRecord>> {
        self.recent_jobs(query).await
    }
}

// ============================================================================
// IMAGE FETCHER: URL to file on disk
// ============================================================================

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Write the body at `url` to `path`, returning the bytes written.
    async fn fetch_to_file(&self, url: &str, path: &Path) -> midjourney_client::Result<u64>;
}

#[async_trait]
impl ImageFetcher for ImageClient {
    async fn fetch_to_file(&self, url: &str, path: &Path) -> midjourney_client::Result<u64> {
        self.download_to_file(url, path).await
    }
}
