//! Integration tests for the Telegram channel using wiremock

use slotwatch::notifications::{Channel, NotificationError, TelegramChannel};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

#[tokio::test]
async fn test_send_posts_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123456:test-token/sendMessage"))
        .and(body_json(serde_json::json!({
            "chat_id": "-1001",
            "text": "hello",
            "parse_mode": "Markdown"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::telegram_ok()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = TelegramChannel::new(common::telegram_config(&mock_server.uri())).unwrap();
    assert!(channel.is_configured());

    let result = channel.send("hello").await;
    assert!(result.is_ok(), "Send should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_ok_false_is_rejected_with_description() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&mock_server)
        .await;

    let channel = TelegramChannel::new(common::telegram_config(&mock_server.uri())).unwrap();
    let err = channel.send("hello").await.unwrap_err();

    assert!(matches!(err, NotificationError::Rejected(_)));
    assert!(err.to_string().contains("chat not found"));
}

#[tokio::test]
async fn test_server_error_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = TelegramChannel::new(common::telegram_config(&mock_server.uri())).unwrap();
    let err = channel.send("hello").await.unwrap_err();

    let text = err.to_string();
    assert!(text.starts_with("Telegram API returned error"));
    assert!(text.contains("502"));
    assert!(text.contains("Bad Gateway"));
}

#[tokio::test]
async fn test_missing_credentials_never_hit_the_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::telegram_ok()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = common::telegram_config(&mock_server.uri());
    config.chat_id = Some("   ".to_string());
    let channel = TelegramChannel::new(config).unwrap();

    assert!(!channel.is_configured());
    let err = channel.send("hello").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Telegram configuration is missing: telegram.chat_id"
    );
}
