//! Progress bar and summary reporting for CLI downloads.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use console::style;
use indicatif::{HumanBytes, HumanDuration, MultiProgress, ProgressBar, ProgressStyle};

use crate::{DownloadProgress, FileStats, SessionStats};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Creates a progress bar for a single file download.
pub fn make_progress_bar(size: u64, name: &str) -> ProgressBar {
    let bar = ProgressBar::new(size);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} - {msg}",
        )
        .expect("progress template is valid")
        .progress_chars("━━╌"),
    );
    bar.set_message(format!("Downloading {name}"));
    bar
}

/// Terminal progress reporter, one bar per in-flight file.
#[derive(Default)]
pub struct CliProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl CliProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_bar(&self, name: &str) -> Option<ProgressBar> {
        self.bars.lock().ok()?.remove(name)
    }
}

impl DownloadProgress for CliProgress {
    fn on_repository_start(&self, name: &str, files: usize) {
        let _ = self.multi.println(format!(
            "{} {files} file(s) found for {}",
            style("==>").green().bold(),
            style(name).bold()
        ));
    }

    fn on_file_start(&self, name: &str, size: u64) {
        let bar = self.multi.add(make_progress_bar(size, name));
        bar.enable_steady_tick(Duration::from_millis(250));
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(name.to_string(), bar);
        }
    }

    fn on_progress(&self, name: &str, bytes_delta: u64) {
        if let Ok(bars) = self.bars.lock()
            && let Some(bar) = bars.get(name)
        {
            bar.inc(bytes_delta);
        }
    }

    fn on_file_complete(&self, name: &str, stats: &FileStats) {
        if let Some(bar) = self.take_bar(name) {
            bar.finish_and_clear();
        }
        let _ = self.multi.println(format!(
            "  {name} - {} in {} ({}/s avg)",
            HumanBytes(stats.size),
            HumanDuration(stats.elapsed),
            HumanBytes(stats.average_speed()),
        ));
    }

    fn on_error(&self, name: &str, error: &str) {
        if let Some(bar) = self.take_bar(name) {
            bar.abandon();
        }
        let _ = self
            .multi
            .println(format!("  {} {name}: {error}", style("skipped").red()));
    }
}

/// Prints the statistics of one repository batch.
pub fn print_repository_summary(name: &str, stats: &SessionStats) {
    println!(
        "{} {name}: {} downloaded, {} failed, {} in {}",
        style("==>").green().bold(),
        stats.files_downloaded,
        stats.files_failed,
        HumanBytes(stats.total_bytes),
        HumanDuration(stats.elapsed),
    );
}

/// Prints a summary of download statistics.
pub fn print_summary(stats: &SessionStats) {
    if stats.files_attempted() == 0 {
        println!("No files found.");
        return;
    }

    println!("\n{SEPARATOR}");
    println!("Download Summary");
    println!("{SEPARATOR}");
    println!("  Files downloaded:  {}", stats.files_downloaded);
    if stats.files_failed > 0 {
        println!("  Files failed:      {}", style(stats.files_failed).red());
    }
    println!("  Total size:        {}", HumanBytes(stats.total_bytes));
    println!("  Total time:        {}", HumanDuration(stats.elapsed));
    println!(
        "  Average speed:     {}/s",
        HumanBytes(stats.average_speed())
    );
    println!("{SEPARATOR}");
}
