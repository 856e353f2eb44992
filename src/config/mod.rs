//! Configuration management for the slotwatch monitor
//!
//! This module handles loading and validating configuration from environment
//! variables (optionally seeded from a `.env` file) and TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Target monitored when nothing is configured
pub const DEFAULT_TARGET: &str = "https://testflight.apple.com/join/72eyUWVE";

/// Default Telegram Bot API endpoint
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Monitoring loop configuration
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Page fetch configuration
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Telegram notification configuration
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Monitoring-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Page locators to monitor, in configuration order
    pub targets: Vec<String>,

    /// Seconds between round dispatches
    pub check_interval_secs: u64,

    /// Consecutive failures before the escalation notice is sent
    pub max_retries: u32,

    /// Seconds before an out-of-band retry of a failed target
    pub retry_delay_secs: u64,

    /// Skip a check when another check of the same target is still running
    pub exclusive_checks: bool,
}

/// Page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Fixed User-Agent; a browser pool is rotated when unset
    pub user_agent: Option<String>,
}

/// Telegram Bot API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    pub bot_token: Option<String>,

    /// Destination chat identifier
    pub chat_id: Option<String>,

    /// API base URL
    pub api_base: String,

    /// Message parse mode
    pub parse_mode: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,

    /// Optional log file, rotated daily
    pub file: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            targets: vec![DEFAULT_TARGET.to_string()],
            check_interval_secs: 10,
            max_retries: 3,
            retry_delay_secs: 30,
            exclusive_checks: false,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            parse_mode: Some(String::from("Markdown")),
            timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("has_bot_token", &self.bot_token.is_some())
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("parse_mode", &self.parse_mode)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TelegramConfig {
    /// Names of the credential settings that are absent or blank
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.bot_token) {
            missing.push("telegram.bot_token");
        }
        if is_blank(&self.chat_id) {
            missing.push("telegram.chat_id");
        }
        missing
    }

    /// Whether both credentials are present
    pub fn is_configured(&self) -> bool {
        self.missing_credentials().is_empty()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first when present.
    /// Numeric settings that are missing, unparsable or zero keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let targets = std::env::var("TESTFLIGHT_URLS")
            .ok()
            .map(|raw| parse_target_list(&raw))
            .filter(|targets| !targets.is_empty())
            .unwrap_or(defaults.monitor.targets);

        let check_interval_secs = env_positive("CHECK_INTERVAL_SECONDS")
            .unwrap_or(defaults.monitor.check_interval_secs);
        let max_retries = env_positive("MAX_RETRIES")
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.monitor.max_retries);
        let retry_delay_secs =
            env_positive("RETRY_DELAY_SECONDS").unwrap_or(defaults.monitor.retry_delay_secs);
        let exclusive_checks = std::env::var("SLOTWATCH_EXCLUSIVE_CHECKS")
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.monitor.exclusive_checks);

        let request_timeout_secs = env_positive("SLOTWATCH_REQUEST_TIMEOUT")
            .unwrap_or(defaults.fetch.request_timeout_secs);
        let user_agent = env_non_empty("SLOTWATCH_USER_AGENT");

        let api_base =
            env_non_empty("TELEGRAM_API_BASE").unwrap_or(defaults.telegram.api_base);

        let level = env_non_empty("LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = env_non_empty("SLOTWATCH_LOG_FORMAT").unwrap_or(defaults.logging.format);
        let file = env_non_empty("SLOTWATCH_LOG_FILE").map(PathBuf::from);

        Ok(Self {
            monitor: MonitorConfig {
                targets,
                check_interval_secs,
                max_retries,
                retry_delay_secs,
                exclusive_checks,
            },
            fetch: FetchConfig {
                request_timeout_secs,
                user_agent,
            },
            telegram: TelegramConfig {
                bot_token: env_non_empty("TELEGRAM_BOT_TOKEN"),
                chat_id: env_non_empty("TELEGRAM_CHAT_ID"),
                api_base,
                ..defaults.telegram
            },
            logging: LoggingConfig {
                level,
                format,
                file,
            },
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::with_source(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| {
            Error::with_source(
                format!("Failed to parse TOML config file: {}", path.display()),
                e,
            )
        })?;

        config.monitor.targets = dedup_targets(std::mem::take(&mut config.monitor.targets));
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Missing Telegram credentials are not an error: monitoring still runs
    /// and every send fails with a descriptive error instead.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.targets.is_empty() {
            return Err(Error::config("at least one target must be configured"));
        }

        for target in &self.monitor.targets {
            let url = Url::parse(target)
                .map_err(|e| Error::config(format!("invalid target '{target}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::config(format!(
                    "target '{target}' must use http or https"
                )));
            }
        }

        if self.monitor.check_interval_secs == 0 {
            return Err(Error::config("check_interval_secs must be greater than 0"));
        }

        if self.monitor.max_retries == 0 {
            return Err(Error::config("max_retries must be greater than 0"));
        }

        if self.fetch.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be greater than 0"));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::config(format!(
                "unknown log format '{}', expected text or json",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Get round interval as Duration
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.check_interval_secs)
    }

    /// Get out-of-band retry delay as Duration
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.monitor.retry_delay_secs)
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            fetch: FetchConfig::default(),
            telegram: TelegramConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Split a comma separated target list, trimming entries and dropping
/// blanks and duplicates while keeping the first occurrence's position.
pub fn parse_target_list(raw: &str) -> Vec<String> {
    dedup_targets(raw.split(',').map(|s| s.trim().to_string()).collect())
}

fn dedup_targets(targets: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    targets
        .into_iter()
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn env_positive(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
