//! Configuration types for discovery and download operations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Browser identification sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:27.0) Gecko/20100101 Firefox/27.0";

/// Size of each body read while streaming a file to disk.
pub const DEFAULT_CHUNK_SIZE: usize = 12 * 1024;

/// Configuration for download operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Number of bytes read from the response body per chunk.
    pub chunk_size: usize,
    /// Number of concurrent file downloads within one repository.
    pub concurrent_files: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrent_files: 1,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the body chunk size. Zero is bumped to one byte.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 { 1 } else { chunk_size };
        self
    }

    /// Sets the number of concurrent file downloads. Zero is bumped to one.
    #[must_use]
    pub const fn with_concurrent_files(mut self, concurrent: usize) -> Self {
        self.concurrent_files = if concurrent == 0 { 1 } else { concurrent };
        self
    }
}

/// Settings used to build the shared HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// `User-Agent` header attached to every request.
    pub user_agent: String,
    /// Skip TLS certificate verification.
    ///
    /// Several academic hosts serve expired or self-signed certificates.
    /// Turning this on trusts any certificate for every request made by the
    /// client.
    pub accept_invalid_certs: bool,
    /// Overall per-request timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            timeout_secs: 0,
        }
    }
}

impl HttpConfig {
    /// Sets whether invalid TLS certificates are accepted.
    #[must_use]
    pub const fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the request timeout, if one is configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

/// Complete application configuration combining download and HTTP settings.
///
/// Unlike [`HttpConfig::default`], the application default accepts invalid
/// certificates so the legacy hosts in the registry stay reachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download configuration.
    pub download: DownloadConfig,
    /// HTTP client configuration.
    pub http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download: DownloadConfig::default(),
            http: HttpConfig::default().with_accept_invalid_certs(true),
        }
    }
}

impl AppConfig {
    /// Default location of the config file, `<config dir>/netgraph-dl/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("netgraph-dl")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str(&contents)?;
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
