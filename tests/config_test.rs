//! Tests for config loading from the environment and TOML files

use serial_test::serial;
use slotwatch::config::{Config, DEFAULT_TARGET, DEFAULT_TELEGRAM_API_BASE};
use std::io::Write;
use std::path::Path;

const ENV_KEYS: &[&str] = &[
    "TESTFLIGHT_URLS",
    "CHECK_INTERVAL_SECONDS",
    "MAX_RETRIES",
    "RETRY_DELAY_SECONDS",
    "SLOTWATCH_EXCLUSIVE_CHECKS",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "TELEGRAM_API_BASE",
    "SLOTWATCH_REQUEST_TIMEOUT",
    "SLOTWATCH_USER_AGENT",
    "LOG_LEVEL",
    "SLOTWATCH_LOG_FORMAT",
    "SLOTWATCH_LOG_FILE",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.monitor.targets, vec![DEFAULT_TARGET.to_string()]);
    assert_eq!(config.monitor.check_interval_secs, 10);
    assert_eq!(config.monitor.max_retries, 3);
    assert_eq!(config.monitor.retry_delay_secs, 30);
    assert!(!config.monitor.exclusive_checks);
    assert_eq!(config.telegram.api_base, DEFAULT_TELEGRAM_API_BASE);
    assert!(!config.telegram.is_configured());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var(
        "TESTFLIGHT_URLS",
        "https://testflight.apple.com/join/aaa, https://testflight.apple.com/join/bbb",
    );
    std::env::set_var("CHECK_INTERVAL_SECONDS", "60");
    std::env::set_var("MAX_RETRIES", "5");
    std::env::set_var("RETRY_DELAY_SECONDS", "15");
    std::env::set_var("SLOTWATCH_EXCLUSIVE_CHECKS", "true");
    std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
    std::env::set_var("TELEGRAM_CHAT_ID", "42");
    std::env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(
        config.monitor.targets,
        vec![
            "https://testflight.apple.com/join/aaa".to_string(),
            "https://testflight.apple.com/join/bbb".to_string(),
        ]
    );
    assert_eq!(config.monitor.check_interval_secs, 60);
    assert_eq!(config.monitor.max_retries, 5);
    assert_eq!(config.monitor.retry_delay_secs, 15);
    assert!(config.monitor.exclusive_checks);
    assert!(config.telegram.is_configured());
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_from_env_invalid_numbers_fall_back() {
    clear_env();
    std::env::set_var("CHECK_INTERVAL_SECONDS", "0");
    std::env::set_var("MAX_RETRIES", "lots");
    std::env::set_var("RETRY_DELAY_SECONDS", "-5");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.monitor.check_interval_secs, 10);
    assert_eq!(config.monitor.max_retries, 3);
    assert_eq!(config.monitor.retry_delay_secs, 30);
}

#[test]
#[serial]
fn test_from_env_blank_target_list_uses_default() {
    clear_env();
    std::env::set_var("TESTFLIGHT_URLS", " , ,");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.monitor.targets, vec![DEFAULT_TARGET.to_string()]);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[monitor]
targets = ["https://testflight.apple.com/join/aaa", "https://testflight.apple.com/join/aaa"]
check_interval_secs = 20

[telegram]
bot_token = "123:abc"
chat_id = "42"

[logging]
format = "json"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.monitor.targets.len(), 1);
    assert_eq!(config.monitor.check_interval_secs, 20);
    assert_eq!(config.monitor.max_retries, 3);
    assert_eq!(config.telegram.parse_mode.as_deref(), Some("Markdown"));
    assert!(config.telegram.is_configured());
    assert_eq!(config.logging.format, "json");
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file_rejects_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[monitor\ntargets = 5").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML config file"));
}

#[test]
fn test_from_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(&dir.path().join("absent.toml"));
    assert!(result.is_err());
}

#[test]
fn test_example_config_is_valid() {
    let config = Config::from_file(Path::new("config.example.toml")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.monitor.targets, vec![DEFAULT_TARGET.to_string()]);
    assert!(!config.telegram.is_configured());
}
