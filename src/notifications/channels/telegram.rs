//! Telegram Bot API channel
//!
//! Sends messages with `sendMessage`. Delivery counts as successful only
//! when the HTTP status is 2xx and the response body reports `"ok": true`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Channel, ChannelResult, NotificationError};
use crate::config::TelegramConfig;
use crate::utils::truncate_text;

/// Longest remote error body quoted in an error
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram notification channel
///
/// Missing credentials do not prevent construction: every send then fails
/// with [`NotificationError::MissingConfig`], so monitoring keeps running
/// and the problem shows up in the logs on each attempt.
///
/// # Example
///
/// ```rust,ignore
/// use slotwatch::notifications::{Channel, TelegramChannel};
///
/// let channel = TelegramChannel::new(config.telegram.clone())?;
/// channel.send("🎉 TestFlight is now AVAILABLE! 🎉").await?;
/// ```
pub struct TelegramChannel {
    config: TelegramConfig,
    client: Client,
}

impl TelegramChannel {
    /// Create a new Telegram channel
    pub fn new(config: TelegramConfig) -> ChannelResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { config, client })
    }

    /// Endpoint for `sendMessage` with the given token
    fn endpoint(&self, bot_token: &str) -> String {
        format!(
            "{}/bot{bot_token}/sendMessage",
            self.config.api_base.trim_end_matches('/')
        )
    }

    fn credentials(&self) -> ChannelResult<(&str, &str)> {
        let missing = self.config.missing_credentials();
        if !missing.is_empty() {
            return Err(NotificationError::MissingConfig(missing.join(", ")));
        }

        match (self.config.bot_token.as_deref(), self.config.chat_id.as_deref()) {
            (Some(token), Some(chat_id)) => Ok((token.trim(), chat_id.trim())),
            _ => Err(NotificationError::MissingConfig(
                "telegram.bot_token, telegram.chat_id".to_string(),
            )),
        }
    }

    async fn deliver(&self, text: &str) -> ChannelResult<()> {
        let (bot_token, chat_id) = self.credentials()?;

        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: self.config.parse_mode.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint(bot_token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(api) if status.is_success() && api.ok => Ok(()),
            Ok(api) => Err(NotificationError::Rejected(match api.description {
                Some(description) => format!("HTTP {status}: {description}"),
                None => format!("HTTP {status}: {}", truncate_text(&body, MAX_ERROR_BODY_CHARS)),
            })),
            Err(_) => Err(NotificationError::Rejected(format!(
                "HTTP {status}: {}",
                truncate_text(&body, MAX_ERROR_BODY_CHARS)
            ))),
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> ChannelResult<()> {
        match self.deliver(text).await {
            Ok(()) => {
                tracing::debug!("Telegram notification sent successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send Telegram notification");
                Err(e)
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
