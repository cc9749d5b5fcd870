//! Streaming download of a single URL to disk.

use std::path::Path;

use bytes::BytesMut;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::DownloadConfig;
use crate::download::DownloadProgress;
use crate::error::{Error, Result};
use crate::stats::{FileStats, TransferTracker};

/// Result of fetching one URL.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The whole body was written to the destination.
    Complete(FileStats),
    /// The request failed; the destination may be missing, empty or partial.
    Failed {
        /// URL that could not be fetched.
        url: String,
        /// What went wrong.
        error: Error,
    },
}

impl FetchOutcome {
    /// Returns true if the file was downloaded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Parses the `Content-Length` header.
pub(crate) fn declared_size(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Writes fixed-size chunks to the destination and reports progress.
struct ChunkWriter<'a> {
    file: File,
    tracker: TransferTracker,
    progress: &'a dyn DownloadProgress,
    name: &'a str,
}

impl ChunkWriter<'_> {
    async fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.file.write_all(chunk).await?;
        let len = chunk.len() as u64;
        self.tracker.record_bytes(len);
        self.progress.on_progress(self.name, len);
        Ok(())
    }

    async fn finish(mut self) -> std::io::Result<FileStats> {
        self.file.flush().await?;
        Ok(self.tracker.into_file_stats())
    }
}

/// Streams remote files to local paths.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    chunk_size: usize,
}

impl Fetcher {
    /// Creates a fetcher using the given client and chunk size.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &DownloadConfig) -> Self {
        Self {
            client,
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Downloads `source_url` into `destination`, creating or truncating it.
    ///
    /// Request-level problems (connection errors, non-2xx statuses, a missing
    /// `Content-Length`, a body cut short) are reported as
    /// [`FetchOutcome::Failed`] so the caller can carry on with other files.
    /// Nothing is retried and partial files are left in place.
    ///
    /// # Errors
    ///
    /// Returns an error only if the destination cannot be created or written.
    pub async fn fetch(
        &self,
        destination: &Path,
        source_url: &str,
        progress: &dyn DownloadProgress,
    ) -> Result<FetchOutcome> {
        let name = destination
            .file_name()
            .map_or_else(|| source_url.to_string(), |n| n.to_string_lossy().into_owned());

        let (mut response, size) = match self.open(source_url).await {
            Ok(opened) => opened,
            Err(e) => return Ok(failed(&name, source_url, e, progress)),
        };

        log::debug!("Downloading {source_url} ({size} bytes) to {}", destination.display());
        progress.on_file_start(&name, size);

        let mut writer = ChunkWriter {
            file: File::create(destination).await?,
            tracker: TransferTracker::new(size),
            progress,
            name: &name,
        };
        let mut pending = BytesMut::with_capacity(self.chunk_size);

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    pending.extend_from_slice(&bytes);
                    while pending.len() >= self.chunk_size {
                        let chunk = pending.split_to(self.chunk_size);
                        writer.write(&chunk).await?;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    writer.finish().await?;
                    return Ok(failed(&name, source_url, e.into(), progress));
                }
            }
        }
        if !pending.is_empty() {
            writer.write(&pending).await?;
        }
        drop(response);

        let stats = writer.finish().await?;
        if stats.is_short() {
            log::warn!(
                "{source_url}: received {} of {} announced bytes",
                stats.size,
                stats.declared_size
            );
        }
        progress.on_file_complete(&name, &stats);
        Ok(FetchOutcome::Complete(stats))
    }

    /// Sends the request and reads the announced body size.
    async fn open(&self, source_url: &str) -> Result<(reqwest::Response, u64)> {
        let response = self
            .client
            .get(source_url)
            .send()
            .await?
            .error_for_status()?;
        let size = declared_size(response.headers()).ok_or_else(|| Error::MissingContentLength {
            url: source_url.to_string(),
        })?;
        Ok((response, size))
    }
}

fn failed(name: &str, url: &str, error: Error, progress: &dyn DownloadProgress) -> FetchOutcome {
    log::error!("Download of {url} failed: {error}");
    progress.on_error(name, &error.to_string());
    FetchOutcome::Failed {
        url: url.to_string(),
        error,
    }
}
