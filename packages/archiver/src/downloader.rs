//! Walks the archive and downloads images of upscale jobs.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

use crate::error::{ArchiveError, Result};
use crate::layout::METADATA_EXTENSION;
use crate::record::{ArchivedJob, MetadataOutcome};
use crate::report::{
    DownloadReport, DOWNLOAD, SKIP_ALREADY_DOWNLOADED, SKIP_INVALID_METADATA,
    SKIP_UNSUPPORTED_EXTENSION,
};
use crate::traits::ImageFetcher;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Where one image of a job goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub url: String,
    pub path: PathBuf,
}

/// Lower-cased extension of the last path segment of `url`. Query string
/// and fragment never count; an unparsable URL or one without a path has
/// no extension.
pub fn url_extension(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Download destinations for a job's images, next to its metadata file.
///
/// A single image shares the metadata stem; several get `-1`..`-N`
/// suffixes in listing order. Every URL is checked before any path is
/// returned, so one bad extension rejects the whole job.
pub fn image_targets(metadata_path: &Path, image_paths: &[String]) -> Result<Vec<ImageTarget>> {
    let stem = metadata_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = metadata_path.parent().unwrap_or_else(|| Path::new(""));

    image_paths
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let extension = url_extension(url);
            if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                return Err(ArchiveError::UnsupportedExtension {
                    url: url.clone(),
                    extension,
                });
            }
            let index = if image_paths.len() == 1 {
                String::new()
            } else {
                format!("-{}", i + 1)
            };
            Ok(ImageTarget {
                url: url.clone(),
                path: dir.join(format!("{stem}{index}.{extension}")),
            })
        })
        .collect()
}

pub struct Downloader<F: ImageFetcher> {
    fetcher: F,
}

impl<F: ImageFetcher> Downloader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Visit every metadata file under `root` and fetch missing images.
    ///
    /// Invalid metadata and unsupported image extensions are counted and
    /// skipped. Transfer failures abort the walk.
    pub async fn walk_archive(&self, root: &Path, report: &mut DownloadReport) -> Result<()> {
        if !root.is_dir() {
            warn!(root = %root.display(), "Archive root does not exist, nothing to download");
            return Ok(());
        }

        for entry in WalkDir::new(root) {
            let entry = entry?;
            let path = entry.path();
            let is_metadata = entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == METADATA_EXTENSION);
            if !is_metadata {
                continue;
            }

            report.files_visited += 1;
            self.process_metadata_file(path, report).await?;
        }

        info!(%report, "Finished downloading");
        Ok(())
    }

    /// Download the images referenced by one metadata file.
    pub async fn process_metadata_file(
        &self,
        path: &Path,
        report: &mut DownloadReport,
    ) -> Result<()> {
        info!(path = %path.display(), "Processing metadata file");
        let text = tokio::fs::read_to_string(path).await?;

        match MetadataOutcome::from_json(&text) {
            MetadataOutcome::Invalid { reason } => {
                warn!(path = %path.display(), %reason, "Skipping invalid metadata file");
                report.counts.incr(SKIP_INVALID_METADATA);
                Ok(())
            }
            MetadataOutcome::Ignored => Ok(()),
            MetadataOutcome::Upscale(job) => self.download_images(path, &job, report).await,
        }
    }

    async fn download_images(
        &self,
        metadata_path: &Path,
        job: &ArchivedJob,
        report: &mut DownloadReport,
    ) -> Result<()> {
        let targets = match image_targets(metadata_path, &job.image_paths) {
            Ok(targets) => targets,
            Err(ArchiveError::UnsupportedExtension { url, extension }) => {
                warn!(
                    job_id = %job.id,
                    %url,
                    %extension,
                    "Skipping job with unsupported image extension"
                );
                report.counts.incr(SKIP_UNSUPPORTED_EXTENSION);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for target in targets {
            if tokio::fs::try_exists(&target.path).await? {
                debug!(path = %target.path.display(), "Skipping, already exists");
                report.counts.incr(SKIP_ALREADY_DOWNLOADED);
                continue;
            }
            self.fetcher.fetch_to_file(&target.url, &target.path).await?;
            report.counts.incr(DOWNLOAD);
        }
        Ok(())
    }
}
