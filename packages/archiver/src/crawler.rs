//! Paginated metadata crawl.

use midjourney_client::{JobRecord, JobTypeFilter, RecentJobsQuery, DEFAULT_PAGE_SIZE};
use tracing::info;

use crate::error::Result;
use crate::report::CrawlReport;
use crate::traits::JobSource;
use crate::writer::MetadataWriter;

/// Options for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum number of pages to request. `None` crawls until an empty page.
    pub limit: Option<u32>,
    pub job_type: JobTypeFilter,
    /// Explicit time cursor. When absent, the cursor is pinned to the newest
    /// job of the first non-empty page.
    pub from_date: Option<String>,
    pub page_size: u32,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            limit: None,
            job_type: JobTypeFilter::default(),
            from_date: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CrawlOptions {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_job_type(mut self, job_type: JobTypeFilter) -> Self {
        self.job_type = job_type;
        self
    }

    pub fn with_from_date(mut self, from_date: impl Into<String>) -> Self {
        self.from_date = Some(from_date.into());
        self
    }
}

pub struct Crawler<S: JobSource> {
    source: S,
    writer: MetadataWriter,
}

impl<S: JobSource> Crawler<S> {
    pub fn new(source: S, writer: MetadataWriter) -> Self {
        Self { source, writer }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch pages from 1 upward, archiving every job, until the listing
    /// runs dry or `limit` pages have been fetched.
    ///
    /// Counts go into `report` as they happen, so an interrupted crawl still
    /// reports what it archived.
    pub async fn crawl(&self, options: &CrawlOptions, report: &mut CrawlReport) -> Result<()> {
        let mut cursor = options.from_date.clone();
        let mut page = 1u32;

        while options.limit.map_or(true, |limit| page <= limit) {
            info!(page, cursor = cursor.as_deref(), "Crawling for job info batch");
            let query = RecentJobsQuery {
                job_type: options.job_type.clone(),
                from_date: cursor.clone(),
                page: Some(page),
                amount: options.page_size,
            };
            let jobs = self.source.fetch_page(&query).await?;
            report.pages_fetched += 1;

            let Some(newest) = jobs.first() else {
                info!("Empty job listing batch: reached end of total job listing");
                break;
            };
            self.archive_jobs(&jobs, report).await?;

            // Listing is newest-first; pin the cursor once so jobs created
            // mid-crawl cannot shift later pages.
            if cursor.is_none() {
                cursor = Some(newest.enqueue_time.as_str().to_string());
            }
            page += 1;
        }

        info!(%report, "Finished crawling");
        Ok(())
    }

    async fn archive_jobs(&self, jobs: &[JobRecord], report: &mut CrawlReport) -> Result<()> {
        for job in jobs {
            report.record_job(job.job_type.as_deref());
            self.writer.write_job(job).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_job, MockJobSource};
    use tempfile::TempDir;

    fn page(ids: &[(&str, &str)]) -> serde_json::Value {
        serde_json::Value::Array(
            ids.iter()
                .map(|(id, t)| sample_job(id, t, "upscale", &[]))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_cursor_pinned_to_first_page() {
        let dir = TempDir::new().unwrap();
        let source = MockJobSource::new()
            .with_listing(page(&[("b", "2023-05-02 10:00:00.0"), ("a", "2023-05-01 10:00:00.0")]))
            .with_listing(page(&[("z", "2023-05-09 10:00:00.0")]));
        let crawler = Crawler::new(source, MetadataWriter::new(dir.path()));

        let mut report = CrawlReport::default();
        crawler.crawl(&CrawlOptions::default(), &mut report).await.unwrap();

        let calls = crawler.source().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].from_date, None);
        assert_eq!(calls[1].from_date.as_deref(), Some("2023-05-02 10:00:00.0"));
        // Second page's newest job does not move the cursor
        assert_eq!(calls[2].from_date.as_deref(), Some("2023-05-02 10:00:00.0"));
        assert_eq!(
            calls.iter().map(|c| c.page).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );
        assert_eq!(report.job_count(), 3);
    }

    #[tokio::test]
    async fn test_explicit_cursor_is_never_replaced() {
        let dir = TempDir::new().unwrap();
        let source = MockJobSource::new()
            .with_listing(page(&[("b", "2023-05-02 10:00:00.0")]))
            .with_listing(page(&[("a", "2023-05-01 10:00:00.0")]));
        let crawler = Crawler::new(source, MetadataWriter::new(dir.path()));

        let options = CrawlOptions::default().with_from_date("2023-06-01 00:00:00.0");
        let mut report = CrawlReport::default();
        crawler.crawl(&options, &mut report).await.unwrap();

        for call in crawler.source().calls() {
            assert_eq!(call.from_date.as_deref(), Some("2023-06-01 00:00:00.0"));
        }
    }

    #[tokio::test]
    async fn test_job_type_filter_passed_unchanged() {
        let dir = TempDir::new().unwrap();
        let source = MockJobSource::new().with_listing(page(&[("a", "2023-05-01 10:00:00.0")]));
        let crawler = Crawler::new(source, MetadataWriter::new(dir.path()));

        let options = CrawlOptions::default().with_job_type(JobTypeFilter::Any);
        let mut report = CrawlReport::default();
        crawler.crawl(&options, &mut report).await.unwrap();

        let calls = crawler.source().calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.job_type == JobTypeFilter::Any));
    }

    #[tokio::test]
    async fn test_limit_zero_fetches_nothing() {
        let dir = TempDir::new().unwrap();
        let crawler = Crawler::new(MockJobSource::new(), MetadataWriter::new(dir.path()));
        let mut report = CrawlReport::default();
        crawler
            .crawl(&CrawlOptions::default().with_limit(0), &mut report)
            .await
            .unwrap();
        assert!(crawler.source().calls().is_empty());
        assert_eq!(report.pages_fetched, 0);
    }
}
