//! Repository download orchestration and progress reporting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use futures::{StreamExt, TryStreamExt, stream};
use url::Url;

use crate::config::DownloadConfig;
use crate::discovery::Discovery;
use crate::error::{Error, Result};
use crate::fetch::{FetchOutcome, Fetcher};
use crate::stats::{FileStats, SessionStats, SessionStatsBuilder};

/// Trait for receiving download progress updates.
///
/// Implement this trait to receive callbacks during download operations.
/// All methods have default no-op implementations for convenience.
pub trait DownloadProgress: Send + Sync {
    /// Called once per repository after discovery, before any file starts.
    fn on_repository_start(&self, _name: &str, _files: usize) {}

    /// Called when a file download starts, with the announced size.
    fn on_file_start(&self, _name: &str, _size: u64) {}

    /// Called after each chunk is written with the number of bytes in it.
    fn on_progress(&self, _name: &str, _bytes_delta: u64) {}

    /// Called when a file download completes successfully.
    fn on_file_complete(&self, _name: &str, _stats: &FileStats) {}

    /// Called when a file is skipped because of an error.
    fn on_error(&self, _name: &str, _error: &str) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {}

/// Derives the local file name of a download URL: its last path segment,
/// without query string or fragment.
///
/// # Errors
///
/// Returns an error if the URL does not parse or its path ends in `/`.
pub fn destination_file_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    parsed
        .path_segments()
        .and_then(Iterator::last)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidFileName {
            url: url.to_string(),
        })
}

/// A URL paired with the file it will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Source URL.
    pub url: String,
    /// Destination file path.
    pub destination: PathBuf,
}

impl DownloadTask {
    /// Creates a task writing `url` into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if no file name can be derived from the URL.
    pub fn new(url: &str, output_dir: &Path) -> Result<Self> {
        Ok(Self {
            url: url.to_string(),
            destination: output_dir.join(destination_file_name(url)?),
        })
    }
}

/// Downloads the discovered files of a repository.
#[derive(Debug, Clone)]
pub struct Downloader {
    fetcher: Fetcher,
    config: DownloadConfig,
}

impl Downloader {
    /// Creates a new downloader sharing `client` for every file.
    #[must_use]
    pub fn new(client: reqwest::Client, config: DownloadConfig) -> Self {
        Self {
            fetcher: Fetcher::new(client, &config),
            config,
        }
    }

    /// Discovers the repository's files and downloads each into `output_dir`.
    ///
    /// The directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository's landing page cannot be fetched or
    /// a file cannot be written locally. Failed downloads are counted in the
    /// returned stats instead.
    pub async fn download_repository(
        &self,
        discovery: &Discovery,
        output_dir: &Path,
        progress: &dyn DownloadProgress,
    ) -> Result<SessionStats> {
        let started = Instant::now();
        let name = &discovery.repository().name;
        let discovered = discovery.discover().await?;

        progress.on_repository_start(name, discovered.len());
        let stats = self.download_all(discovered.iter(), output_dir, progress).await?;

        log::info!(
            "It took {:.2}s to download {name} networks.",
            started.elapsed().as_secs_f64()
        );
        Ok(stats)
    }

    /// Downloads every URL into `output_dir`, in the order given.
    ///
    /// URLs that map to the same local file name are fetched one after the
    /// other, so the last of them wins, even when several files are
    /// downloaded concurrently.
    ///
    /// # Errors
    ///
    /// Individual file download errors are logged but do not cause the
    /// entire operation to fail; only local I/O errors do.
    pub async fn download_all<'a>(
        &self,
        urls: impl IntoIterator<Item = &'a str>,
        output_dir: &Path,
        progress: &dyn DownloadProgress,
    ) -> Result<SessionStats> {
        let outcomes: Vec<Vec<FetchOutcome>> = stream::iter(group_by_destination(urls, output_dir))
            .map(|group| self.download_group(group, progress))
            .buffered(self.config.concurrent_files.max(1))
            .try_collect()
            .await?;

        let mut builder = SessionStatsBuilder::new();
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                FetchOutcome::Complete(file_stats) => builder.add_download(&file_stats),
                FetchOutcome::Failed { .. } => builder.add_failure(),
            }
        }

        Ok(builder.build())
    }

    /// Downloads the URLs of one group sequentially.
    async fn download_group(
        &self,
        group: Vec<(&str, Result<DownloadTask>)>,
        progress: &dyn DownloadProgress,
    ) -> Result<Vec<FetchOutcome>> {
        let mut outcomes = Vec::with_capacity(group.len());
        for (url, task) in group {
            let outcome = match task {
                Ok(task) => {
                    self.fetcher
                        .fetch(&task.destination, &task.url, progress)
                        .await?
                }
                Err(error) => {
                    log::error!("Skipping {url}: {error}");
                    progress.on_error(url, &error.to_string());
                    FetchOutcome::Failed {
                        url: url.to_string(),
                        error,
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Groups URLs that share a destination, keeping first-occurrence order.
/// URLs without a usable file name each get a group of their own.
fn group_by_destination<'a>(
    urls: impl IntoIterator<Item = &'a str>,
    output_dir: &Path,
) -> Vec<Vec<(&'a str, Result<DownloadTask>)>> {
    let mut groups: Vec<Vec<(&'a str, Result<DownloadTask>)>> = Vec::new();
    let mut by_destination: HashMap<PathBuf, usize> = HashMap::new();

    for url in urls {
        let task = DownloadTask::new(url, output_dir);
        let index = match &task {
            Ok(task) => *by_destination
                .entry(task.destination.clone())
                .or_insert(groups.len()),
            Err(_) => groups.len(),
        };
        if index == groups.len() {
            groups.push(Vec::new());
        } else {
            log::warn!(
                "{url} shares its file name with an earlier URL and will overwrite it"
            );
        }
        groups[index].push((url, task));
    }
    groups
}
