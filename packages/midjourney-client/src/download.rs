//! Streaming image fetch.

use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{MidjourneyError, Result};

/// Downloads rendered images. Image URLs are public, so no session is sent.
#[derive(Clone, Default)]
pub struct ImageClient {
    client: reqwest::Client,
}

impl ImageClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream `url` into a file at `path`, chunk by chunk.
    ///
    /// Returns the number of bytes written. A failure mid-stream leaves the
    /// partial file in place.
    pub async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        tracing::info!(url, path = %path.display(), "Downloading image");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MidjourneyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(bytes = written, path = %path.display(), "Image written");
        Ok(written)
    }
}
