//! Pure Midjourney REST API client.
//!
//! A minimal client for the `recent-jobs` listing endpoint of the
//! Midjourney web app, plus a streaming fetcher for the images the
//! listing links to.
//!
//! # Example
//!
//! ```rust,ignore
//! use midjourney_client::{MidjourneyClient, RecentJobsQuery};
//!
//! let client = MidjourneyClient::new("user-id".into(), "session-token".into());
//!
//! let jobs = client.recent_jobs(&RecentJobsQuery::default()).await?;
//! for job in &jobs {
//!     println!("{} {}", job.id, job.prompt);
//! }
//! ```

pub mod download;
pub mod error;
pub mod types;

pub use download::ImageClient;
pub use error::{MidjourneyError, Result};
pub use types::{
    parse_listing, EnqueueTime, JobId, JobRecord, JobTypeFilter, RecentJobsQuery,
    DEFAULT_PAGE_SIZE, UPSCALE,
};

use reqwest::header::{CONTENT_TYPE, COOKIE};

pub const RECENT_JOBS_URL: &str = "https://www.midjourney.com/api/app/recent-jobs/";

/// Name of the cookie carrying the web session.
const SESSION_COOKIE: &str = "__Secure-next-auth.session-token";

pub struct MidjourneyClient {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
    session_token: String,
}

impl MidjourneyClient {
    pub fn new(user_id: String, session_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: RECENT_JOBS_URL.to_string(),
            user_id,
            session_token,
        }
    }

    /// Point the listing requests at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Fetch one page of completed jobs, newest first.
    ///
    /// An empty page means the listing is exhausted. Non-JSON responses and
    /// payloads of unexpected shape are errors; nothing is retried.
    pub async fn recent_jobs(&self, query: &RecentJobsQuery) -> Result<Vec<JobRecord>> {
        let params = query.to_params(&self.user_id);
        tracing::info!(url = %self.base_url, ?params, "Requesting recent jobs");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&params)
            .header(COOKIE, format!("{SESSION_COOKIE}={}", self.session_token))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MidjourneyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("application/json") {
            return Err(MidjourneyError::UnexpectedContentType(content_type));
        }

        let body = resp.text().await?;
        let listing: serde_json::Value = serde_json::from_str(&body)?;
        parse_listing(listing)
    }
}
