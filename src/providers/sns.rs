use async_trait::async_trait;
use aws_sdk_sns::Client;
use aws_sdk_sns::types::MessageAttributeValue;
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

const PROVIDER_NAME: &str = "sns";

/// Direct-to-phone SMS delivery through AWS SNS. Credentials come from the
/// SDK's default chain, same as the SES mailer.
pub struct SnsSmsSender {
    client: Client,
    sender_id: Option<String>,
}

impl SnsSmsSender {
    pub fn new(client: Client, sender_id: Option<String>) -> Self {
        Self { client, sender_id }
    }

    pub async fn from_env(region: String, sender_id: Option<String>) -> Self {
        let config = aws_config::from_env()
            .region(aws_config::Region::new(region))
            .load()
            .await;

        Self::new(Client::new(&config), sender_id)
    }
}

#[async_trait]
impl Provider for SnsSmsSender {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            name: PROVIDER_NAME,
            channel: Channel::Sms,
        }
    }

    async fn send(&self, job: &NotificationJob) -> Result<ProviderResult, DispatchError> {
        let to = job
            .phone
            .as_deref()
            .ok_or_else(|| DispatchError::delivery(PROVIDER_NAME, "job has no phone recipient"))?;

        debug!(recipient = %mask_recipient(to), "Sending SMS via AWS SNS");

        let mut request = self
            .client
            .publish()
            .phone_number(to)
            .message(job.body.clone().unwrap_or_default());

        if let Some(sender_id) = &self.sender_id {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(sender_id)
                .build()
                .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

            request = request.message_attributes("AWS.SNS.SMS.SenderID", attribute);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

        let message_id = response.message_id().unwrap_or("unknown");

        Ok(ProviderResult::accepted(format!(
            "sns accepted message {}",
            message_id
        )))
    }
}
