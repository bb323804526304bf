//! Typed errors for the archiver library.

use midjourney_client::MidjourneyError;
use thiserror::Error;

/// Errors that abort a crawl or an archive walk.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Listing request, response validation or image transfer failed
    #[error(transparent)]
    Client(#[from] MidjourneyError),

    /// Reading or writing the archive failed
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Traversing the archive tree failed
    #[error("archive walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Serializing a job record failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image URL does not end in a known image extension
    #[error("unsupported image extension {extension:?} in {url}")]
    UnsupportedExtension { url: String, extension: String },
}

/// Result type alias for archiver operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
