//! Common test utilities

#![allow(dead_code)]

use slotwatch::config::TelegramConfig;

/// Join page of a beta that accepts testers
pub const AVAILABLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Join the Acme Photo Editor beta - TestFlight - Apple</title></head>
<body>
  <div class="beta-status">
    <h1 class="beta-status__app-title">Acme Photo Editor</h1>
    <a role="button" href="itms-beta://testflight.apple.com/join/abc">Join the Beta</a>
  </div>
</body>
</html>"#;

/// Join page of a beta with no open slots
pub const FULL_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Join the Acme Photo Editor beta - TestFlight - Apple</title></head>
<body>
  <div class="beta-status">
    <h1 class="beta-status__app-title">Acme Photo Editor</h1>
    <span class="beta-status__title">This beta is full.</span>
  </div>
</body>
</html>"#;

/// Telegram configuration pointing at a mock server
pub fn telegram_config(api_base: &str) -> TelegramConfig {
    TelegramConfig {
        bot_token: Some("123456:test-token".to_string()),
        chat_id: Some("-1001".to_string()),
        api_base: api_base.to_string(),
        ..Default::default()
    }
}

/// Successful sendMessage response body
pub fn telegram_ok() -> serde_json::Value {
    serde_json::json!({
        "ok": true,
        "result": { "message_id": 7, "chat": { "id": -1001 }, "text": "sent" }
    })
}
