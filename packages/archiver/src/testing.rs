//! Testing utilities including mock implementations.
//!
//! These are useful for testing the crawl and download loops without
//! making real network calls.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use midjourney_client::{parse_listing, JobRecord, MidjourneyError, RecentJobsQuery};
use serde_json::{json, Value};

use crate::traits::{ImageFetcher, JobSource};

/// Build a listing entry the way the service returns it.
pub fn sample_job(id: &str, enqueue_time: &str, job_type: &str, image_paths: &[&str]) -> Value {
    json!({
        "id": id,
        "enqueue_time": enqueue_time,
        "type": job_type,
        "prompt": format!("prompt for {id}"),
        "full_command": format!("prompt for {id} --v 5"),
        "image_paths": image_paths,
        "current_status": "completed",
    })
}

/// A mock listing endpoint.
///
/// Serves scripted raw payloads by page number (page 1 is the first
/// listing added) through the same validation as the real client. Pages
/// past the script answer with the "no jobs" sentinel.
#[derive(Default)]
pub struct MockJobSource {
    listings: Vec<Value>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<RecentJobsQuery>>>,
}

impl MockJobSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the raw payload for the next page.
    pub fn with_listing(mut self, listing: Value) -> Self {
        self.listings.push(listing);
        self
    }

    pub fn calls(&self) -> Vec<RecentJobsQuery> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl JobSource for MockJobSource {
    async fn fetch_page(&self, query: &RecentJobsQuery) -> midjourney_client::Result<Vec<JobRecord>> {
        self.calls.write().unwrap().push(query.clone());

        let index = query.page.unwrap_or(1).saturating_sub(1) as usize;
        let listing = self
            .listings
            .get(index)
            .cloned()
            .unwrap_or_else(|| json!([{ "msg": "No jobs found." }]));
        parse_listing(listing)
    }
}

/// A mock image host that writes fixed bytes for every URL, except the
/// ones set up to fail.
pub struct MockImageFetcher {
    body: Vec<u8>,
    failing: Vec<String>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<(String, PathBuf)>>>,
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self {
            body: b"\x89PNG\r\n\x1a\n".to_vec(),
            failing: Vec::new(),
            calls: Arc::default(),
        }
    }
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Answer `url` with a server error instead of an image.
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failing.push(url.into());
        self
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch_to_file(&self, url: &str, path: &Path) -> midjourney_client::Result<u64> {
        self.calls
            .write()
            .unwrap()
            .push((url.to_string(), path.to_path_buf()));
        if self.failing.iter().any(|u| u == url) {
            return Err(MidjourneyError::Api {
                status: 503,
                message: format!("mock failure for {url}"),
            });
        }
        tokio::fs::write(path, &self.body).await?;
        Ok(self.body.len() as u64)
    }
}
