//! netgraph-dl - A library for downloading network datasets from public
//! repositories.
//!
//! Each repository publishes its files through a different HTML layout.
//! Discovery turns a repository's landing page into the set of direct
//! download URLs; the downloader then streams each of them to disk.
//!
//! # Example
//!
//! ```no_run
//! use netgraph_dl::{Discovery, DownloadConfig, Downloader, HttpConfig, NoProgress, Registry};
//!
//! # async fn example() -> netgraph_dl::Result<()> {
//! let registry = Registry::load("repositories.json".as_ref())?;
//! let client = netgraph_dl::build_client(&HttpConfig::default())?;
//!
//! // Discover the download URLs of one repository
//! let discovery = Discovery::new(registry.get("snap")?.clone(), client.clone());
//! for url in discovery.discover().await?.iter() {
//!     println!("{url}");
//! }
//!
//! // Download them with no progress reporting
//! let downloader = Downloader::new(client, DownloadConfig::default());
//! let stats = downloader
//!     .download_repository(&discovery, "out/snap".as_ref(), &NoProgress)
//!     .await?;
//! println!("Downloaded {} files", stats.files_downloaded);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod discovery;
pub mod download;
pub mod error;
pub mod fetch;
pub mod http;
pub mod registry;
pub mod stats;

// Re-export main types for convenience
pub use config::{AppConfig, DownloadConfig, HttpConfig};
pub use discovery::{DiscoveredUrls, Discovery, Site, SiteLayout};
pub use download::{
    DownloadProgress, DownloadTask, Downloader, NoProgress, destination_file_name,
};
pub use error::{Error, Result};
pub use fetch::{FetchOutcome, Fetcher};
pub use http::build_client;
pub use registry::{Registry, Repository};
pub use stats::{FileStats, SessionStats, SessionStatsBuilder};
