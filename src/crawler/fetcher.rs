//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with a proper user agent string
//! - Per-vendor timeouts taken from the rule table
//! - Retry logic with a fixed pause between attempts
//! - Classifying the final outcome of a fetch

use crate::config::{FetchConfig, UserAgentConfig};
use crate::rules::DomainRule;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Outcome of fetching one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// HTTP 200 with the page body
    Success(String),

    /// Any other status code, seen on the last attempt
    HttpError(u16),

    /// Connection, DNS or body-read failure on the last attempt
    NetworkError(String),

    /// The last attempt ran out of time
    Timeout,
}

/// Result of a fetch operation, consumed right away by the crawler
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: Url,
    pub status: FetchStatus,

    /// Number of attempts made, including the successful one
    pub attempts: u32,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Success(_))
    }

    /// Returns the body on success; any failure yields `None`
    pub fn into_body(self) -> Option<String> {
        match self.status {
            FetchStatus::Success(body) => Some(body),
            _ => None,
        }
    }
}

/// Retry and timeout policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per URL, including the first
    pub max_retries: u32,

    /// Per-attempt timeout when the rule has no override
    pub base_timeout: Duration,

    /// Pause between attempts
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_timeout: Duration::from_secs(20),
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            base_timeout: Duration::from_secs(config.base_timeout_secs),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// No client-wide timeout is set, not even for connecting: each request
/// carries the timeout of the vendor it targets.
///
/// # Example
///
/// ```no_run
/// use rent_scout::config::UserAgentConfig;
/// use rent_scout::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher shared by every crawl task
///
/// Cloning is cheap; the underlying client is reference counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Per-attempt timeout for a vendor
    pub fn timeout_for(&self, rule: &DomainRule) -> Duration {
        rule.request_timeout_override
            .unwrap_or(self.policy.base_timeout)
    }

    /// Fetches a URL with retries
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return body |
    /// | Any other status | Retry |
    /// | Timeout | Retry |
    /// | Connection / DNS / body error | Retry |
    ///
    /// Attempts are separated by the policy's retry delay. Once attempts run
    /// out the last failure is returned; this never errors.
    pub async fn fetch(&self, url: &Url, rule: &DomainRule) -> FetchResult {
        let timeout = self.timeout_for(rule);
        let max = self.policy.max_retries.max(1);
        let mut status = FetchStatus::Timeout;

        for attempt in 1..=max {
            status = self.attempt(url, timeout).await;

            match &status {
                FetchStatus::Success(_) => {
                    tracing::debug!(%url, attempt, "Fetched page");
                    return FetchResult {
                        url: url.clone(),
                        status,
                        attempts: attempt,
                    };
                }
                FetchStatus::HttpError(code) => {
                    tracing::warn!("Attempt {}: status code {} for {}", attempt, code, url);
                }
                FetchStatus::NetworkError(error) => {
                    tracing::warn!("Attempt {} failed for {}: {}", attempt, url, error);
                }
                FetchStatus::Timeout => {
                    tracing::warn!(
                        "Attempt {} timed out after {:?} for {}",
                        attempt,
                        timeout,
                        url
                    );
                }
            }

            if attempt < max {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }

        tracing::error!("All {} attempts failed for {}", max, url);
        FetchResult {
            url: url.clone(),
            status,
            attempts: max,
        }
    }

    /// Performs a single GET and classifies the outcome
    async fn attempt(&self, url: &Url, timeout: Duration) -> FetchStatus {
        let response = match self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        if response.status() != StatusCode::OK {
            return FetchStatus::HttpError(response.status().as_u16());
        }

        match response.text().await {
            Ok(body) => FetchStatus::Success(body),
            Err(e) => classify_error(&e),
        }
    }
}

fn classify_error(error: &reqwest::Error) -> FetchStatus {
    if error.is_timeout() {
        FetchStatus::Timeout
    } else {
        FetchStatus::NetworkError(error.to_string())
    }
}
