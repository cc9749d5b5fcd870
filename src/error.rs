//! Error types for the netgraph-dl library.

use thiserror::Error;

/// Errors that can occur during discovery and download operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured or extracted URL could not be parsed.
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// Underlying parse failure.
        source: url::ParseError,
    },

    /// The repository id is not known or not configured.
    #[error("Unknown repository: {0}")]
    UnknownRepository(String),

    /// The repository registry file could not be parsed.
    #[error("Registry parsing failed: {0}")]
    Registry(#[from] serde_json::Error),

    /// The application config file could not be parsed.
    #[error("Config parsing failed: {0}")]
    Config(#[from] toml::de::Error),

    /// The server did not declare a usable `Content-Length`.
    #[error("Missing or invalid Content-Length for {url}")]
    MissingContentLength {
        /// URL of the response without a size.
        url: String,
    },

    /// No destination file name can be derived from the URL.
    #[error("Cannot derive a file name from {url}")]
    InvalidFileName {
        /// URL without a final path segment.
        url: String,
    },
}

/// A specialized `Result` type for netgraph-dl operations.
pub type Result<T> = std::result::Result<T, Error>;
