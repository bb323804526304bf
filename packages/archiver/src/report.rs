//! Per-run tallies, reported when a run ends or is interrupted.

use std::collections::BTreeMap;
use std::fmt;

pub const JOB: &str = "job";
pub const DOWNLOAD: &str = "download";
pub const SKIP_ALREADY_DOWNLOADED: &str = "skip already downloaded";
pub const SKIP_INVALID_METADATA: &str = "skip invalid metadata";
pub const SKIP_UNSUPPORTED_EXTENSION: &str = "skip unsupported extension";

/// String-keyed tally, displayed in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter(BTreeMap<String, u64>);

impl Counter {
    pub fn incr(&mut self, key: impl Into<String>) {
        *self.0.entry(key.into()).or_default() += 1;
    }

    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(none)");
        }
        for (i, (key, count)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={count}")?;
        }
        Ok(())
    }
}

/// Outcome of a metadata crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub pages_fetched: u32,
    /// Keyed by `job` and `job type=<type>`.
    pub jobs: Counter,
}

impl CrawlReport {
    pub fn record_job(&mut self, job_type: Option<&str>) {
        self.jobs.incr(JOB);
        self.jobs
            .incr(format!("job type={}", job_type.unwrap_or("unknown")));
    }

    pub fn job_count(&self) -> u64 {
        self.jobs.get(JOB)
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pages={}, {}", self.pages_fetched, self.jobs)
    }
}

/// Outcome of an image download walk.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub files_visited: u64,
    pub counts: Counter,
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "files={}, {}", self.files_visited, self.counts)
    }
}
