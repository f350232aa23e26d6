//! Utility functions for the Inter-Actief connector
//!
//! Base URL normalization and HTTP client construction shared by both
//! consumers, and random identifier generation for JSON-RPC request ids and
//! OAuth state values.

use rand::Rng;
use rand::distributions::Alphanumeric;
use std::time::Duration;

/// Client identifier sent as `User-Agent` with every request
pub const USER_AGENT: &str = concat!("iaconnector/", env!("CARGO_PKG_VERSION"));

/// Ensure a base URL ends with exactly one trailing `/`.
///
/// A slash is appended only when missing; a URL that already ends with one
/// is returned unchanged.
///
/// # Example
/// ```
/// use iaconnector::utils::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://test.example/api"), "https://test.example/api/");
/// assert_eq!(normalize_base_url("https://test.example/api/"), "https://test.example/api/");
/// ```
#[must_use]
pub fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

/// Generate a random ASCII alphanumeric string of `len` characters.
///
/// # Example
/// ```
/// use iaconnector::utils::random_alphanumeric;
///
/// let id = random_alphanumeric(10);
/// assert_eq!(id.len(), 10);
/// assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
#[must_use]
pub fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Build the HTTP client used by a consumer.
///
/// The timeout is passed through to the transport; no timeout is applied
/// when `None`.
pub(crate) fn build_http_client(
    timeout: Option<Duration>,
    user_agent: &str,
) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
