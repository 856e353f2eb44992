//! Unified error handling for the slotwatch crate
//!
//! Per-check and per-notification failures keep their own types in
//! [`crate::utils::error`]; they never leave the monitor loop. [`Error`]
//! covers what can stop the process at startup.
//!
//! # Architecture
//!
//! - [`SlotwatchErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for log fields
//! - [`Error`] - Startup errors surfaced to `main`

use thiserror::Error;

pub use crate::utils::error::{CheckError, FetchError, NotificationError, ParseError};

/// Common trait for all slotwatch error types
pub trait SlotwatchErrorTrait: std::error::Error {
    /// Get the error category, logged alongside the error
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, bad status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Notification delivery errors
    Notification,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Notification => "notification",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for the slotwatch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SlotwatchErrorTrait for FetchError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl SlotwatchErrorTrait for ParseError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

impl SlotwatchErrorTrait for CheckError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Parse(e) => e.category(),
        }
    }
}

impl SlotwatchErrorTrait for NotificationError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfig(_) => ErrorCategory::Config,
            Self::Http(_) | Self::Rejected(_) => ErrorCategory::Notification,
        }
    }
}

impl SlotwatchErrorTrait for Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
