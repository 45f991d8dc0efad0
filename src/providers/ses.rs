use async_trait::async_trait;
use aws_sdk_sesv2::Client;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use tracing::debug;

use crate::{
    models::{
        channel::{Channel, ProviderDescriptor},
        error::DispatchError,
        message::NotificationJob,
        outcome::ProviderResult,
    },
    providers::Provider,
    utils::mask_recipient,
};

const PROVIDER_NAME: &str = "ses";

/// Email delivery through AWS SES v2. Credentials come from the SDK's
/// default chain (env vars, IAM role, shared credentials file).
pub struct SesMailer {
    client: Client,
    from_email: String,
}

impl SesMailer {
    pub fn new(client: Client, from_email: String) -> Self {
        Self { client, from_email }
    }

    pub async fn from_env(region: Option<String>, from_email: String) -> Self {
        let mut loader = aws_config::from_env();

        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }

        let config = loader.load().await;

        Self::new(Client::new(&config), from_email)
    }
}

#[async_trait]
impl Provider for SesMailer {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            name: PROVIDER_NAME,
            channel: Channel::Email,
        }
    }

    async fn send(&self, job: &NotificationJob) -> Result<ProviderResult, DispatchError> {
        let to = job
            .email
            .as_deref()
            .ok_or_else(|| DispatchError::delivery(PROVIDER_NAME, "job has no email recipient"))?;

        debug!(recipient = %mask_recipient(to), "Sending email via AWS SES");

        let destination = Destination::builder().to_addresses(to).build();

        let subject = Content::builder()
            .data(job.subject.as_deref().unwrap_or("Notification"))
            .charset("UTF-8")
            .build()
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

        let body_text = Content::builder()
            .data(job.body.clone().unwrap_or_default())
            .charset("UTF-8")
            .build()
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().text(body_text).build())
            .build();

        let content = EmailContent::builder().simple(message).build();

        let response = self
            .client
            .send_email()
            .from_email_address(&self.from_email)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

        let message_id = response.message_id().unwrap_or("unknown");

        Ok(ProviderResult::accepted(format!(
            "ses accepted message {}",
            message_id
        )))
    }
}
