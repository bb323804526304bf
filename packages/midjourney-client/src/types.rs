use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::{MidjourneyError, Result};

/// Fields the first job of a page must carry for the page to be accepted.
const LISTING_FIELDS: [&str; 3] = ["id", "enqueue_time", "prompt"];

/// Message the listing endpoint returns in place of an empty array.
const NO_JOBS_MESSAGE: &str = "No jobs found.";

/// Default number of jobs requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Job category filter for the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobTypeFilter {
    /// No `jobType` parameter is sent.
    Any,
    /// Only jobs of this category.
    Only(String),
    #[default]
    Upscale,
}

impl JobTypeFilter {
    pub fn as_param(&self) -> Option<&str> {
        match self {
            JobTypeFilter::Any => None,
            JobTypeFilter::Only(job_type) => Some(job_type.as_str()),
            JobTypeFilter::Upscale => Some(UPSCALE),
        }
    }
}

impl FromStr for JobTypeFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "any" => JobTypeFilter::Any,
            UPSCALE => JobTypeFilter::Upscale,
            other => JobTypeFilter::Only(other.to_string()),
        })
    }
}

impl fmt::Display for JobTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param().unwrap_or("any"))
    }
}

/// Job type of upscaled renders, the only jobs with final images.
pub const UPSCALE: &str = "upscale";

/// Parameters of one `recent-jobs` request.
#[derive(Debug, Clone)]
pub struct RecentJobsQuery {
    pub job_type: JobTypeFilter,
    /// Time cursor (`fromDate`), pinning the newest edge of the listing.
    pub from_date: Option<String>,
    pub page: Option<u32>,
    pub amount: u32,
}

impl Default for RecentJobsQuery {
    fn default() -> Self {
        Self {
            job_type: JobTypeFilter::default(),
            from_date: None,
            page: None,
            amount: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RecentJobsQuery {
    /// Render the query string parameters, fixed ones first.
    pub fn to_params(&self, user_id: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("amount", self.amount.to_string())];
        if let Some(job_type) = self.job_type.as_param() {
            params.push(("jobType", job_type.to_string()));
        }
        params.extend([
            ("orderBy", "new".to_string()),
            ("jobStatus", "completed".to_string()),
            ("userId", user_id.to_string()),
            ("dedupe", "true".to_string()),
            ("refreshApi", "0".to_string()),
        ]);
        if let Some(from_date) = &self.from_date {
            params.push(("fromDate", from_date.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

/// Job identifier. Numeric ids are kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job's `enqueue_time`, with its original text kept for use as a cursor.
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.ffffff]`. When only the date portion
/// parses, the time is taken as midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueTime {
    raw: String,
    at: NaiveDateTime,
}

impl EnqueueTime {
    pub fn parse(raw: &str) -> Option<Self> {
        let at = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .or_else(|| {
                let date = raw.split_whitespace().next()?;
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .ok()?
                    .and_hms_opt(0, 0, 0)
            })?;
        Some(Self {
            raw: raw.to_string(),
            at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.at
    }
}

/// One job from the listing: the raw JSON object plus typed views of
/// the fields the archiver depends on.
#[derive(Debug, Clone)]
pub struct JobRecord {
    raw: Map<String, Value>,
    pub id: JobId,
    pub enqueue_time: EnqueueTime,
    pub job_type: Option<String>,
    pub prompt: String,
    pub full_command: Option<String>,
    pub image_paths: Vec<String>,
}

impl JobRecord {
    /// Validate one listing element. `index` is its position in the page.
    pub fn from_value(index: usize, value: Value) -> Result<Self> {
        let invalid = |reason: &str| MidjourneyError::InvalidJob {
            index,
            reason: reason.to_string(),
        };

        let Value::Object(raw) = value else {
            return Err(invalid("not a JSON object"));
        };

        let id = raw
            .get("id")
            .and_then(JobId::from_value)
            .ok_or_else(|| invalid("missing or non-scalar `id`"))?;
        let enqueue_time = raw
            .get("enqueue_time")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing `enqueue_time`"))?;
        let enqueue_time = EnqueueTime::parse(enqueue_time)
            .ok_or_else(|| invalid(&format!("unparsable `enqueue_time` {enqueue_time:?}")))?;
        let prompt = raw
            .get("prompt")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing `prompt`"))?
            .to_string();

        let job_type = raw.get("type").and_then(Value::as_str).map(String::from);
        let full_command = raw
            .get("full_command")
            .and_then(Value::as_str)
            .map(String::from);
        let image_paths = raw
            .get("image_paths")
            .and_then(Value::as_array)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            raw,
            id,
            enqueue_time,
            job_type,
            prompt,
            full_command,
            image_paths,
        })
    }

    /// The record exactly as the service returned it.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_raw(self) -> Map<String, Value> {
        self.raw
    }
}

/// Validate a `recent-jobs` payload into a page of jobs, newest first.
///
/// The "no jobs" sentinel yields an empty page. Anything else that is not
/// an array whose first element carries `id`, `enqueue_time` and `prompt`
/// is rejected with the payload attached.
pub fn parse_listing(value: Value) -> Result<Vec<JobRecord>> {
    let Value::Array(items) = value else {
        return Err(MidjourneyError::InvalidListing(value));
    };

    let first = items.first().and_then(Value::as_object);
    let is_page = first.is_some_and(|job| LISTING_FIELDS.iter().all(|f| job.contains_key(*f)));
    let is_no_jobs = first.is_some_and(|msg| {
        msg.get("msg").and_then(Value::as_str) == Some(NO_JOBS_MESSAGE)
    });

    if is_page {
        tracing::info!(count = items.len(), "Got job listing");
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| JobRecord::from_value(index, item))
            .collect()
    } else if is_no_jobs {
        tracing::info!("Response: no jobs found");
        Ok(Vec::new())
    } else {
        Err(MidjourneyError::InvalidListing(Value::Array(items)))
    }
}
