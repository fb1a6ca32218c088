//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent
//! - GET requests with redirects followed by reqwest
//! - Classifying response statuses
//!
//! Failures are not retried; the caller abandons the target's subtree.

use crate::config::UserAgentConfig;
use crate::crawler::target::{CrawlTarget, RawDocument};
use crate::HarvestError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use journal_harvest::config::UserAgentConfig;
/// use journal_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.clone())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a response with this status is handed to a stage handler
///
/// The site answers some article pages with 401 while still serving the
/// markup the handlers need, so 401 is processed like a success.
pub fn is_processable(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::UNAUTHORIZED
}

/// Fetches a target's page
///
/// # Returns
///
/// * `Ok(RawDocument)` - Body of a processable response
/// * `Err(HarvestError::Status)` - Any other status
/// * `Err(HarvestError::Http)` - Network, timeout, or body decoding failure
pub async fn fetch(client: &Client, target: CrawlTarget) -> Result<RawDocument, HarvestError> {
    let response = client
        .get(&target.url)
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: target.url.clone(),
            source,
        })?;

    let status = response.status();
    if !is_processable(status) {
        return Err(HarvestError::Status {
            url: target.url,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| HarvestError::Http {
        url: target.url.clone(),
        source,
    })?;

    Ok(RawDocument::new(target, status.as_u16(), body))
}
