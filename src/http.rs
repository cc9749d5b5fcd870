//! Shared HTTP client construction.

use std::time::Duration;

use crate::config::HttpConfig;

/// Builds the HTTP client used for both page discovery and file downloads.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client(config: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    if config.accept_invalid_certs {
        log::warn!("TLS certificate verification is disabled for all requests");
    }

    let mut builder = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30));

    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}
