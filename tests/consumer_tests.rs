use std::sync::Arc;

use dispatch_service::consumer::{AckDecision, process_payload};
use dispatch_service::dispatcher::Dispatcher;
use dispatch_service::models::channel::Channel;
use dispatch_service::providers::Provider;
use dispatch_service::resolver::ProviderResolver;
use tokio::time::Duration;

use crate::support::{MockBehavior, MockProvider, test_job};

fn dispatcher_with(providers: Vec<Arc<dyn Provider>>) -> Dispatcher {
    Dispatcher::new(
        Arc::new(ProviderResolver::new(providers)),
        Duration::from_secs(5),
    )
}

/// Test: A fully delivered job is acknowledged
#[tokio::test]
async fn test_successful_job_is_acked() {
    let email = MockProvider::new("mock-email", Channel::Email, MockBehavior::Accept);
    let dispatcher = dispatcher_with(vec![email as Arc<dyn Provider>]);

    let job = test_job(vec![Channel::Email], Some("u@x.com"), None);
    let payload = serde_json::to_vec(&job).expect("job serializes");

    let decision = process_payload(&dispatcher, &payload).await;

    assert_eq!(decision, AckDecision::Ack);
}

/// Test: A delivery failure is returned to the queue for redelivery
#[tokio::test]
async fn test_delivery_failure_is_requeued() {
    let email = MockProvider::new("mock-email", Channel::Email, MockBehavior::Accept);
    let sms = MockProvider::new("mock-sms", Channel::Sms, MockBehavior::Fail);

    let dispatcher = dispatcher_with(vec![
        email as Arc<dyn Provider>,
        sms as Arc<dyn Provider>,
    ]);

    let job = test_job(
        vec![Channel::Email, Channel::Sms],
        Some("u@x.com"),
        Some("+100000"),
    );
    let payload = serde_json::to_vec(&job).expect("job serializes");

    let decision = process_payload(&dispatcher, &payload).await;

    assert_eq!(decision, AckDecision::Requeue);
}

/// Test: A job failing only on unconfigured channels is dead-lettered
#[tokio::test]
async fn test_unconfigured_only_failure_is_dead_lettered() {
    let dispatcher = dispatcher_with(Vec::new());

    let job = test_job(vec![Channel::Whatsapp], None, Some("+100000"));
    let payload = serde_json::to_vec(&job).expect("job serializes");

    let decision = process_payload(&dispatcher, &payload).await;

    assert!(matches!(decision, AckDecision::DeadLetter { .. }));
}

/// Test: A structurally invalid job is dead-lettered, never requeued
#[tokio::test]
async fn test_invalid_job_is_dead_lettered() {
    let email = MockProvider::new("mock-email", Channel::Email, MockBehavior::Accept);
    let dispatcher = dispatcher_with(vec![email as Arc<dyn Provider>]);

    let job = test_job(Vec::new(), Some("u@x.com"), None);
    let payload = serde_json::to_vec(&job).expect("job serializes");

    let decision = process_payload(&dispatcher, &payload).await;

    match decision {
        AckDecision::DeadLetter { reason } => {
            assert!(reason.contains("invalid notification job"));
        }
        other => panic!("expected dead-letter, got {:?}", other),
    }
}

/// Test: An undeserializable payload is dead-lettered
#[tokio::test]
async fn test_malformed_payload_is_dead_lettered() {
    let dispatcher = dispatcher_with(Vec::new());

    let decision = process_payload(&dispatcher, b"not json at all").await;

    match decision {
        AckDecision::DeadLetter { reason } => {
            assert!(reason.contains("deserialize"));
        }
        other => panic!("expected dead-letter, got {:?}", other),
    }
}

/// Test: Processing the same payload twice yields the same decision
#[tokio::test]
async fn test_redelivered_payload_is_reprocessed_cleanly() {
    let email = MockProvider::new("mock-email", Channel::Email, MockBehavior::Accept);
    let dispatcher = dispatcher_with(vec![email.clone() as Arc<dyn Provider>]);

    let job = test_job(vec![Channel::Email], Some("u@x.com"), None);
    let payload = serde_json::to_vec(&job).expect("job serializes");

    let first = process_payload(&dispatcher, &payload).await;
    let second = process_payload(&dispatcher, &payload).await;

    assert_eq!(first, AckDecision::Ack);
    assert_eq!(second, AckDecision::Ack);
    assert_eq!(email.send_calls(), 2);
}
