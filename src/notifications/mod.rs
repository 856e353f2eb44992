//! Notification messages and delivery channels
//!
//! Two messages leave the monitor: the availability notice, sent on every
//! check that finds open slots, and the escalation warning, sent once per
//! failure streak. There is no recovery notice.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────┐
//! │     MonitorLoop      │────▶│  dyn Channel     │
//! │  (availability /     │     │  TelegramChannel │
//! │   escalation text)   │     └──────────────────┘
//! └──────────────────────┘
//! ```

pub mod channels;

pub use channels::telegram::TelegramChannel;
pub use channels::{Channel, ChannelResult, NotificationError};

use crate::utils::truncate_text;

/// Longest error text quoted in an escalation warning
const MAX_ERROR_CHARS: usize = 500;

/// Message sent whenever a check finds open slots
pub fn availability_message(display_name: &str, url: &str) -> String {
    format!("🎉 TestFlight is now AVAILABLE! 🎉\n\nApp: {display_name}\n\nGet it now: {url}")
}

/// Message sent once when a target's failure streak reaches the ceiling
pub fn escalation_message(url: &str, error: &str) -> String {
    format!(
        "⚠️ Warning: Having trouble checking TestFlight availability.\nURL: {url}\nError: {}\n\nWill continue monitoring, but you may want to check manually.",
        truncate_text(error, MAX_ERROR_CHARS)
    )
}
