//! HTTP fetcher for TestFlight join pages
//!
//! This module provides the page fetcher used by every check, with:
//! - Browser-like headers and User-Agent rotation
//! - A fixed request timeout
//! - Charset detection and decoding via encoding_rs
//!
//! The fetcher never retries on its own; retry policy belongs to the
//! monitor loop.

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use rand::seq::SliceRandom;
use reqwest::{Client, Response};
use std::time::Duration;

use super::headers::{build_page_headers, USER_AGENTS};
use super::PageSource;
use crate::config::FetchConfig;
use crate::utils::error::FetchError;
use crate::utils::extract_domain;

/// Page fetcher for monitored targets
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Fixed User-Agent, if configured
    user_agent: Option<String>,

    /// Request timeout, kept for diagnostics
    timeout: Duration,
}

impl PageFetcher {
    /// Create a new fetcher with the default 10 second timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a new fetcher with a custom timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self {
            client,
            user_agent: None,
            timeout,
        })
    }

    /// Create a fetcher from the fetch section of the configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_timeout(Duration::from_secs(config.request_timeout_secs))?;
        fetcher.user_agent = config.user_agent.clone();
        Ok(fetcher)
    }

    /// Pin the User-Agent instead of rotating through the pool
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a page and decode it to text
    ///
    /// # Errors
    ///
    /// - `FetchError::InvalidUrl` if the locator is not a URL with a host
    /// - `FetchError::Timeout` if the request exceeded the timeout
    /// - `FetchError::Status` for non-success responses
    /// - `FetchError::Http` for other transport failures
    /// - `FetchError::Decode` if the body cannot be decoded
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let host = extract_domain(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let headers = build_page_headers(self.user_agent());

        tracing::debug!(url = %url, host = %host, "Fetching page");

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        self.decode_response(response).await
    }

    /// Decode response body using the charset from its Content-Type
    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        decode_bytes(&bytes, &content_type)
    }

    /// Pick the User-Agent for the next request
    fn user_agent(&self) -> &str {
        match &self.user_agent {
            Some(agent) => agent,
            None => random_user_agent(),
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.fetch(url).await
    }
}

/// Decode bytes to a UTF-8 string using the declared charset
///
/// Falls back to UTF-8 when the Content-Type carries no charset or an
/// unknown label.
///
/// # Errors
///
/// Returns `FetchError::Decode` if the bytes are not valid in the chosen
/// encoding
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    let encoding = charset_label(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (cow, _encoding, had_errors) = encoding.decode(bytes);

    if had_errors {
        return Err(FetchError::Decode(format!(
            "{} decoding errors",
            encoding.name()
        )));
    }

    Ok(cow.into_owned())
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_string())
        })
}

/// Get a random user agent from the pool
fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
}
