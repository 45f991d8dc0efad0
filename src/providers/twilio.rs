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

const TWILIO_API_URL: &str = "https://api.twilio.com";
const SMS_PROVIDER_NAME: &str = "twilio-sms";
const WHATSAPP_PROVIDER_NAME: &str = "twilio-whatsapp";

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: Option<String>,
    status: Option<String>,
}

/// Shared plumbing for the Twilio Messages API; SMS and WhatsApp are the same
/// endpoint with differently prefixed addresses.
struct TwilioApi {
    http_client: Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioApi {
    fn new(account_sid: String, auth_token: String) -> Self {
        Self {
            http_client: Client::new(),
            account_sid,
            auth_token,
            base_url: TWILIO_API_URL.to_string(),
        }
    }

    async fn send_message(
        &self,
        provider: &'static str,
        to: &str,
        from: &str,
        body: &str,
    ) -> Result<ProviderResult, DispatchError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let params = [("To", to), ("From", from), ("Body", body)];

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| DispatchError::delivery(provider, e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let created: TwilioMessageResponse = response
                .json()
                .await
                .unwrap_or(TwilioMessageResponse {
                    sid: None,
                    status: None,
                });

            Ok(ProviderResult::accepted(format!(
                "twilio accepted message {} ({})",
                created.sid.as_deref().unwrap_or("unknown"),
                created.status.as_deref().unwrap_or("queued")
            )))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(DispatchError::delivery(
                provider,
                format!("twilio returned {}: {}", status, error_text),
            ))
        }
    }
}

/// SMS delivery through the Twilio Messages API.
pub struct TwilioSmsSender {
    api: TwilioApi,
    from_number: String,
}

impl TwilioSmsSender {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            api: TwilioApi::new(account_sid, auth_token),
            from_number,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Provider for TwilioSmsSender {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            name: SMS_PROVIDER_NAME,
            channel: Channel::Sms,
        }
    }

    async fn send(&self, job: &NotificationJob) -> Result<ProviderResult, DispatchError> {
        let to = job.phone.as_deref().ok_or_else(|| {
            DispatchError::delivery(SMS_PROVIDER_NAME, "job has no phone recipient")
        })?;

        debug!(recipient = %mask_recipient(to), "Sending SMS via Twilio");

        self.api
            .send_message(
                SMS_PROVIDER_NAME,
                to,
                &self.from_number,
                job.body.as_deref().unwrap_or_default(),
            )
            .await
    }
}

/// WhatsApp delivery through the Twilio Messages API. Same wire contract as
/// SMS with `whatsapp:`-prefixed addresses, registered as its own
/// single-channel provider.
pub struct TwilioWhatsAppSender {
    api: TwilioApi,
    from_number: String,
}

impl TwilioWhatsAppSender {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            api: TwilioApi::new(account_sid, auth_token),
            from_number,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    fn whatsapp_address(number: &str) -> String {
        if number.starts_with("whatsapp:") {
            number.to_string()
        } else {
            format!("whatsapp:{}", number)
        }
    }
}

#[async_trait]
impl Provider for TwilioWhatsAppSender {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            name: WHATSAPP_PROVIDER_NAME,
            channel: Channel::Whatsapp,
        }
    }

    async fn send(&self, job: &NotificationJob) -> Result<ProviderResult, DispatchError> {
        let to = job.phone.as_deref().ok_or_else(|| {
            DispatchError::delivery(WHATSAPP_PROVIDER_NAME, "job has no phone recipient")
        })?;

        debug!(recipient = %mask_recipient(to), "Sending WhatsApp message via Twilio");

        self.api
            .send_message(
                WHATSAPP_PROVIDER_NAME,
                &Self::whatsapp_address(to),
                &Self::whatsapp_address(&self.from_number),
                job.body.as_deref().unwrap_or_default(),
            )
            .await
    }
}
