use dispatch_service::models::channel::Channel;
use dispatch_service::models::error::DispatchError;
use dispatch_service::providers::{
    Provider, SendGridMailer, TwilioSmsSender, TwilioWhatsAppSender, VonageSmsSender,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::test_job;

/// Test: SendGrid acceptance maps to a successful provider result
#[tokio::test]
async fn test_sendgrid_accepted_send() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("Authorization", "Bearer SG.test-key"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let provider = SendGridMailer::new("SG.test-key".to_string(), "noreply@x.com".to_string())
        .with_base_url(server.uri());

    let job = test_job(vec![Channel::Email], Some("u@x.com"), None);

    let result = provider.send(&job).await.expect("send should complete");

    assert!(result.success);
    assert!(provider.supports(Channel::Email));
    assert!(!provider.supports(Channel::Sms));
}

/// Test: A SendGrid error status surfaces as a delivery error
#[tokio::test]
async fn test_sendgrid_error_status_is_delivery_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let provider = SendGridMailer::new("SG.test-key".to_string(), "noreply@x.com".to_string())
        .with_base_url(server.uri());

    let job = test_job(vec![Channel::Email], Some("u@x.com"), None);

    let result = provider.send(&job).await;

    match result {
        Err(e @ DispatchError::Delivery { .. }) => assert!(e.is_retryable()),
        other => panic!("expected delivery error, got {:?}", other),
    }
}

/// Test: Twilio SMS posts to the account's Messages endpoint
#[tokio::test]
async fn test_twilio_sms_accepted_send() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sid": "SM42",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TwilioSmsSender::new(
        "AC123".to_string(),
        "token".to_string(),
        "+15550001111".to_string(),
    )
    .with_base_url(server.uri());

    let job = test_job(vec![Channel::Sms], None, Some("+15552223333"));

    let result = provider.send(&job).await.expect("send should complete");

    assert!(result.success);
    assert!(result.message.contains("SM42"));
}

/// Test: Twilio WhatsApp prefixes both addresses with the whatsapp scheme
#[tokio::test]
async fn test_twilio_whatsapp_uses_prefixed_addresses() {
    let server = MockServer::start().await;

    // Form encoding turns "whatsapp:+" into "whatsapp%3A%2B".
    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
        .and(body_string_contains("To=whatsapp%3A%2B15552223333"))
        .and(body_string_contains("From=whatsapp%3A%2B15550001111"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sid": "SM43",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TwilioWhatsAppSender::new(
        "AC123".to_string(),
        "token".to_string(),
        "+15550001111".to_string(),
    )
    .with_base_url(server.uri());

    let job = test_job(vec![Channel::Whatsapp], None, Some("+15552223333"));

    let result = provider.send(&job).await.expect("send should complete");

    assert!(result.success);
    assert!(provider.supports(Channel::Whatsapp));
}

/// Test: Twilio error status surfaces as a delivery error
#[tokio::test]
async fn test_twilio_error_status_is_delivery_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string("authentication required"))
        .mount(&server)
        .await;

    let provider = TwilioSmsSender::new(
        "AC123".to_string(),
        "bad-token".to_string(),
        "+15550001111".to_string(),
    )
    .with_base_url(server.uri());

    let job = test_job(vec![Channel::Sms], None, Some("+15552223333"));

    let result = provider.send(&job).await;

    assert!(matches!(result, Err(DispatchError::Delivery { .. })));
}

/// Test: Vonage status zero is an accepted send
#[tokio::test]
async fn test_vonage_accepted_send() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sms/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message-count": "1",
            "messages": [{"status": "0", "message-id": "0A001"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = VonageSmsSender::new(
        "key".to_string(),
        "secret".to_string(),
        "ACME".to_string(),
    )
    .with_base_url(server.uri());

    let job = test_job(vec![Channel::Sms], None, Some("+15552223333"));

    let result = provider.send(&job).await.expect("send should complete");

    assert!(result.success);
    assert!(result.message.contains("0A001"));
}

/// Test: Vonage non-zero status is completed-but-rejected, not a call failure
#[tokio::test]
async fn test_vonage_rejected_status_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sms/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message-count": "1",
            "messages": [{"status": "4", "error-text": "Bad Credentials"}]
        })))
        .mount(&server)
        .await;

    let provider = VonageSmsSender::new(
        "key".to_string(),
        "wrong-secret".to_string(),
        "ACME".to_string(),
    )
    .with_base_url(server.uri());

    let job = test_job(vec![Channel::Sms], None, Some("+15552223333"));

    let result = provider.send(&job).await.expect("call itself completed");

    assert!(!result.success);
    assert!(result.message.contains("Bad Credentials"));
}
