//! Download statistics types.

use std::time::{Duration, Instant};

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn bytes_per_sec(bytes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        (bytes as f64 / secs) as u64
    } else {
        0
    }
}

/// Statistics for a single file download.
#[derive(Debug, Clone)]
pub struct FileStats {
    /// Number of bytes written to disk.
    pub size: u64,
    /// Size announced by the server's `Content-Length` header.
    pub declared_size: u64,
    /// Time taken to download the file.
    pub elapsed: Duration,
}

impl FileStats {
    /// Returns the average download speed in bytes per second.
    #[must_use]
    pub fn average_speed(&self) -> u64 {
        bytes_per_sec(self.size, self.elapsed)
    }

    /// Returns true if fewer bytes arrived than the server announced.
    #[must_use]
    pub const fn is_short(&self) -> bool {
        self.size < self.declared_size
    }
}

/// Statistics for one repository batch.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Number of files successfully downloaded.
    pub files_downloaded: usize,
    /// Number of files that failed and were skipped.
    pub files_failed: usize,
    /// Total bytes downloaded.
    pub total_bytes: u64,
    /// Total elapsed time for the batch.
    pub elapsed: Duration,
}

impl SessionStats {
    /// Creates a new empty session stats.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            files_downloaded: 0,
            files_failed: 0,
            total_bytes: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns the average download speed in bytes per second.
    #[must_use]
    pub fn average_speed(&self) -> u64 {
        bytes_per_sec(self.total_bytes, self.elapsed)
    }

    /// Number of files attempted in the batch.
    #[must_use]
    pub const fn files_attempted(&self) -> usize {
        self.files_downloaded + self.files_failed
    }

    /// Folds another batch into this one.
    pub fn merge(&mut self, other: &Self) {
        self.files_downloaded += other.files_downloaded;
        self.files_failed += other.files_failed;
        self.total_bytes += other.total_bytes;
        self.elapsed += other.elapsed;
    }
}

/// Tracks bytes written for a single in-flight download.
pub(crate) struct TransferTracker {
    start_time: Instant,
    declared_size: u64,
    written: u64,
}

impl TransferTracker {
    pub(crate) fn new(declared_size: u64) -> Self {
        Self {
            start_time: Instant::now(),
            declared_size,
            written: 0,
        }
    }

    pub(crate) const fn record_bytes(&mut self, bytes: u64) {
        self.written += bytes;
    }

    pub(crate) fn into_file_stats(self) -> FileStats {
        FileStats {
            size: self.written,
            declared_size: self.declared_size,
            elapsed: self.start_time.elapsed(),
        }
    }
}

/// Builder for accumulating session statistics during downloads.
pub struct SessionStatsBuilder {
    files_downloaded: usize,
    files_failed: usize,
    total_bytes: u64,
    start_time: Instant,
}

impl Default for SessionStatsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStatsBuilder {
    /// Creates a new session stats builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files_downloaded: 0,
            files_failed: 0,
            total_bytes: 0,
            start_time: Instant::now(),
        }
    }

    /// Records a completed file download.
    pub const fn add_download(&mut self, file_stats: &FileStats) {
        self.files_downloaded += 1;
        self.total_bytes += file_stats.size;
    }

    /// Records a file that was skipped after an error.
    pub const fn add_failure(&mut self) {
        self.files_failed += 1;
    }

    /// Builds the final session statistics.
    #[must_use]
    pub fn build(self) -> SessionStats {
        SessionStats {
            files_downloaded: self.files_downloaded,
            files_failed: self.files_failed,
            total_bytes: self.total_bytes,
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_stats_default() {
        let stats = SessionStats::default();
        assert_eq!(stats.files_downloaded, 0);
        assert_eq!(stats.files_failed, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn session_stats_average_speed_zero_elapsed() {
        let stats = SessionStats {
            files_downloaded: 1,
            files_failed: 0,
            total_bytes: 1000,
            elapsed: Duration::ZERO,
        };
        assert_eq!(stats.average_speed(), 0);
    }

    #[test]
    fn session_stats_average_speed() {
        let stats = SessionStats {
            files_downloaded: 1,
            files_failed: 0,
            total_bytes: 1000,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(stats.average_speed(), 500);
    }

    #[test]
    fn session_stats_merge() {
        let mut total = SessionStats::new();
        total.merge(&SessionStats {
            files_downloaded: 2,
            files_failed: 1,
            total_bytes: 300,
            elapsed: Duration::from_secs(1),
        });
        total.merge(&SessionStats {
            files_downloaded: 1,
            files_failed: 0,
            total_bytes: 100,
            elapsed: Duration::from_secs(2),
        });
        assert_eq!(total.files_attempted(), 4);
        assert_eq!(total.total_bytes, 400);
        assert_eq!(total.elapsed, Duration::from_secs(3));
    }

    #[test]
    fn transfer_tracker_counts_written_bytes() {
        let mut tracker = TransferTracker::new(100);
        tracker.record_bytes(60);
        tracker.record_bytes(30);
        let stats = tracker.into_file_stats();
        assert_eq!(stats.size, 90);
        assert_eq!(stats.declared_size, 100);
        assert!(stats.is_short());
    }

    #[test]
    fn session_stats_builder() {
        let mut builder = SessionStatsBuilder::new();
        builder.add_failure();

        let file_stats = FileStats {
            size: 500,
            declared_size: 500,
            elapsed: Duration::from_secs(1),
        };
        builder.add_download(&file_stats);

        let stats = builder.build();
        assert_eq!(stats.files_downloaded, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.total_bytes, 500);
        assert_eq!(file_stats.average_speed(), 500);
    }
}
