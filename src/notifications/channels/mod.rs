//! Notification channels for delivering messages
//!
//! A channel delivers one text message per call. Channels never retry,
//! batch or deduplicate; retry policy belongs to the caller.

pub mod telegram;

use async_trait::async_trait;

pub use crate::utils::error::NotificationError;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, NotificationError>;

/// Trait for notification channels
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name
    fn name(&self) -> &str;

    /// Deliver a text message, succeeding only once the remote confirms it
    async fn send(&self, text: &str) -> ChannelResult<()>;

    /// Whether the channel has what it needs to attempt delivery
    fn is_configured(&self) -> bool {
        true
    }
}
