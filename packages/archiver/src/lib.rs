//! Midjourney job archive.
//!
//! Two decoupled tools share a date-partitioned directory tree:
//!
//! - the metadata crawler ([`crawler`]) pages through the `recent-jobs`
//!   listing and writes each job's JSON record and prompt summary;
//! - the image downloader ([`downloader`]) walks the archived JSON files and
//!   fetches the images of upscale jobs that are not on disk yet.
//!
//! # Usage
//!
//! ```rust,ignore
//! use archiver::{CrawlOptions, CrawlReport, Crawler, MetadataWriter};
//! use midjourney_client::MidjourneyClient;
//!
//! let client = MidjourneyClient::new(user_id, session_token);
//! let crawler = Crawler::new(client, MetadataWriter::new("mj-archive"));
//!
//! let mut report = CrawlReport::default();
//! crawler.crawl(&CrawlOptions::default().with_limit(10), &mut report).await?;
//! ```

pub mod config;
pub mod crawler;
pub mod downloader;
pub mod error;
pub mod layout;
pub mod logging;
pub mod record;
pub mod report;
// Mocks, feature-gated
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;
pub mod writer;

pub use config::Credentials;
pub use crawler::{CrawlOptions, Crawler};
pub use downloader::{image_targets, Downloader, ImageTarget};
pub use error::{ArchiveError, Result};
pub use record::{ArchivedJob, MetadataOutcome};
pub use report::{CrawlReport, DownloadReport};
pub use traits::{ImageFetcher, JobSource};
pub use writer::MetadataWriter;
