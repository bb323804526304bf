//! Error types for the Midjourney client.

use thiserror::Error;

/// Result type for Midjourney client operations.
pub type Result<T> = std::result::Result<T, MidjourneyError>;

/// Midjourney client errors.
#[derive(Debug, Error)]
pub enum MidjourneyError {
    /// Network error (connection failed, body stream interrupted)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Listing endpoint answered with something other than JSON
    #[error("unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// Body claimed to be JSON but did not parse
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Listing payload is not a page of jobs nor the "no jobs" sentinel
    #[error("invalid job listing: {0}")]
    InvalidListing(serde_json::Value),

    /// A record inside an accepted page is unusable
    #[error("invalid job at index {index}: {reason}")]
    InvalidJob { index: usize, reason: String },

    /// Writing a streamed download to disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
