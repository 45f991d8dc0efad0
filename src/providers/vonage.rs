use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
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

const PROVIDER_NAME: &str = "vonage";
const VONAGE_API_URL: &str = "https://rest.nexmo.com";

// Vonage reports per-message status inside a 200 response; "0" is the only
// accepted status.
#[derive(Debug, Deserialize)]
struct VonageResponse {
    messages: Vec<VonageMessageStatus>,
}

#[derive(Debug, Deserialize)]
struct VonageMessageStatus {
    status: String,

    #[serde(rename = "error-text")]
    error_text: Option<String>,

    #[serde(rename = "message-id")]
    message_id: Option<String>,
}

/// SMS delivery through the Vonage (Nexmo) SMS API.
pub struct VonageSmsSender {
    http_client: Client,
    api_key: String,
    api_secret: String,
    from: String,
    base_url: String,
}

impl VonageSmsSender {
    pub fn new(api_key: String, api_secret: String, from: String) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            api_secret,
            from,
            base_url: VONAGE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Provider for VonageSmsSender {
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

        debug!(recipient = %mask_recipient(to), "Sending SMS via Vonage");

        let params = [
            ("api_key", self.api_key.as_str()),
            ("api_secret", self.api_secret.as_str()),
            ("from", self.from.as_str()),
            ("to", to.trim_start_matches('+')),
            ("text", job.body.as_deref().unwrap_or_default()),
        ];

        let url = format!("{}/sms/json", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DispatchError::delivery(
                PROVIDER_NAME,
                format!("vonage returned {}: {}", status, error_text),
            ));
        }

        let parsed: VonageResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, format!("unreadable response: {e}")))?;

        let first = parsed.messages.first().ok_or_else(|| {
            DispatchError::delivery(PROVIDER_NAME, "response carried no message status")
        })?;

        if first.status == "0" {
            Ok(ProviderResult::accepted(format!(
                "vonage accepted message {}",
                first.message_id.as_deref().unwrap_or("unknown")
            )))
        } else {
            Ok(ProviderResult::rejected(format!(
                "vonage rejected message (status {}): {}",
                first.status,
                first.error_text.as_deref().unwrap_or("no error text")
            )))
        }
    }
}
