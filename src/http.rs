//! Outbound HTTP client shared by both components

use reqwest::Client;

use crate::config::HttpConfig;
use crate::{Error, Result};

/// User agent sent on discovery, key-set and introspection calls
pub const USER_AGENT: &str = concat!("token-gate/", env!("CARGO_PKG_VERSION"));

/// Build the per-process HTTP client.
///
/// Timeouts are always bounded; no retries are configured.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .https_only(config.https_only)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
}

/// Describe a reqwest failure without echoing request bodies.
pub(crate) fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else if let Some(status) = err.status() {
        format!("HTTP {status}")
    } else {
        err.to_string()
    }
}
