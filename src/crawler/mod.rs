//! Page retrieval for monitored targets
//!
//! [`PageSource`] is the seam the monitor loop fetches through; the
//! production implementation is [`fetcher::PageFetcher`].

pub mod fetcher;
pub mod headers;

use async_trait::async_trait;

pub use fetcher::PageFetcher;

use crate::utils::error::FetchError;

/// Source of raw page content for a target locator
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieve the page behind `url` as text
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}
