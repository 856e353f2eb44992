//! Error types for the slotwatch monitor
//!
//! This module defines the per-check and per-notification error types used
//! throughout the application.

use thiserror::Error;

/// Errors that can occur while fetching a target page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-success response status
    #[error("Request failed with status code {0}")]
    Status(u16),

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors that can occur while classifying a fetched page
#[derive(Error, Debug)]
pub enum ParseError {
    /// The response body had no content to inspect
    #[error("Page body is empty")]
    EmptyDocument,
}

/// Failure of a single availability check
#[derive(Error, Debug)]
pub enum CheckError {
    /// Fetch error
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Errors that can occur while delivering a notification
#[derive(Error, Debug)]
pub enum NotificationError {
    /// Destination credentials are not configured
    #[error("Telegram configuration is missing: {0}")]
    MissingConfig(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint reported a failure
    #[error("Telegram API returned error: {0}")]
    Rejected(String),
}
