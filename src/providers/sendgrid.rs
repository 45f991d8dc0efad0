use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
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

const PROVIDER_NAME: &str = "sendgrid";
const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

/// Email delivery through the SendGrid v3 mail API.
pub struct SendGridMailer {
    http_client: Client,
    api_key: String,
    from_email: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendGridRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            from_email,
            base_url: SENDGRID_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Provider for SendGridMailer {
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

        debug!(recipient = %mask_recipient(to), "Sending email via SendGrid");

        let request = SendGridRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: to.to_string(),
                }],
            }],
            from: EmailAddress {
                email: self.from_email.clone(),
            },
            subject: job.subject.clone().unwrap_or_else(|| "Notification".to_string()),
            content: vec![Content {
                content_type: "text/plain".to_string(),
                value: job.body.clone().unwrap_or_default(),
            }],
        };

        let url = format!("{}/v3/mail/send", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            Ok(ProviderResult::accepted(format!(
                "sendgrid accepted message ({})",
                status
            )))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(DispatchError::delivery(
                PROVIDER_NAME,
                format!("sendgrid returned {}: {}", status, error_text),
            ))
        }
    }
}
