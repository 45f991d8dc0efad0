use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use dispatch_service::models::channel::{Channel, ProviderDescriptor};
use dispatch_service::models::error::DispatchError;
use dispatch_service::models::message::NotificationJob;
use dispatch_service::models::outcome::ProviderResult;
use dispatch_service::providers::Provider;
use tokio::time::{Duration, sleep};

/// How a mock provider reacts to a send.
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// Upstream accepts the message.
    Accept,
    /// Call completes but the upstream rejects the message.
    Reject,
    /// The external call fails outright.
    Fail,
    /// Never completes within any reasonable timeout.
    Hang,
}

/// In-memory provider that records how often it was queried and invoked.
pub struct MockProvider {
    name: &'static str,
    channel: Channel,
    behavior: MockBehavior,
    descriptor_calls: AtomicU32,
    send_calls: AtomicU32,
}

impl MockProvider {
    pub fn new(name: &'static str, channel: Channel, behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            channel,
            behavior,
            descriptor_calls: AtomicU32::new(0),
            send_calls: AtomicU32::new(0),
        })
    }

    pub fn descriptor_calls(&self) -> u32 {
        self.descriptor_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> u32 {
        self.send_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn descriptor(&self) -> ProviderDescriptor {
        self.descriptor_calls.fetch_add(1, Ordering::SeqCst);

        ProviderDescriptor {
            name: self.name,
            channel: self.channel,
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn supports(&self, channel: Channel) -> bool {
        self.channel == channel
    }

    async fn send(&self, _job: &NotificationJob) -> Result<ProviderResult, DispatchError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Accept => Ok(ProviderResult::accepted(format!("{} accepted", self.name))),
            MockBehavior::Reject => Ok(ProviderResult::rejected(format!("{} rejected", self.name))),
            MockBehavior::Fail => Err(DispatchError::delivery(self.name, "simulated outage")),
            MockBehavior::Hang => {
                sleep(Duration::from_secs(3600)).await;
                Ok(ProviderResult::accepted("unreachable".to_string()))
            }
        }
    }
}

pub fn test_job(
    channels: Vec<Channel>,
    email: Option<&str>,
    phone: Option<&str>,
) -> NotificationJob {
    NotificationJob {
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        channels,
        subject: Some("Test subject".to_string()),
        body: Some("Test body".to_string()),
        template_code: None,
        variables: HashMap::new(),
        origin: "test-suite".to_string(),
        trace_id: Some(uuid::Uuid::new_v4().to_string()),
    }
}
