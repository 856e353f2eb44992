//! slotwatch - TestFlight beta availability monitor
//!
//! Periodically fetches TestFlight join pages, decides whether each beta
//! still accepts testers, and sends a Telegram message whenever one does.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration from the environment or a TOML file
//! - [`crawler`] - Page fetching with browser-like headers
//! - [`parser`] - Availability classification of fetched pages
//! - [`monitor`] - Per-target check state machine
//! - [`notifications`] - Notification messages and the Telegram channel
//! - [`scheduler`] - Periodic rounds and deferred retries
//! - [`utils`] - Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use slotwatch::config::Config;
//! use slotwatch::crawler::PageFetcher;
//! use slotwatch::notifications::TelegramChannel;
//! use slotwatch::scheduler::Scheduler;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let source = Arc::new(PageFetcher::from_config(&config.fetch)?);
//!     let channel = Arc::new(TelegramChannel::new(config.telegram.clone())?);
//!     Scheduler::from_config(&config, source, channel).run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod monitor;
pub mod notifications;
pub mod parser;
pub mod scheduler;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{PageFetcher, PageSource};
    pub use crate::error::{Error, ErrorCategory, Result, SlotwatchErrorTrait};
    pub use crate::monitor::{CheckOutcome, FailureAction, MonitorLoop, Trigger};
    pub use crate::notifications::{Channel, TelegramChannel};
    pub use crate::parser::{AvailabilityClassifier, AvailabilityResult};
    pub use crate::scheduler::Scheduler;
}

// Direct re-exports for convenience
pub use parser::{classify, AvailabilityResult};
