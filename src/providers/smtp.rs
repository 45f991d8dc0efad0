use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
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

const PROVIDER_NAME: &str = "smtp";

/// Email delivery over a plain SMTP relay. Works against production relays
/// with STARTTLS as well as local dev servers like Mailpit.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
}

impl SmtpMailer {
    pub fn new(
        host: String,
        port: u16,
        from_email: String,
        username: Option<String>,
        password: Option<String>,
        use_tls: bool,
    ) -> Self {
        let mut builder = if use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                .unwrap_or_else(|_| AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
        }
        .port(port);

        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Self {
            transport: builder.build(),
            from_email,
        }
    }
}

#[async_trait]
impl Provider for SmtpMailer {
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

        debug!(recipient = %mask_recipient(to), "Sending email via SMTP relay");

        let from = self
            .from_email
            .parse()
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, format!("invalid from address: {e}")))?;
        let to_mailbox = to
            .parse()
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(job.subject.as_deref().unwrap_or("Notification"))
            .header(ContentType::TEXT_PLAIN)
            .body(job.body.clone().unwrap_or_default())
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, format!("message build failed: {e}")))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| DispatchError::delivery(PROVIDER_NAME, e.to_string()))?;

        if response.is_positive() {
            Ok(ProviderResult::accepted(format!(
                "smtp relay accepted message ({})",
                response.code()
            )))
        } else {
            Ok(ProviderResult::rejected(format!(
                "smtp relay refused message ({})",
                response.code()
            )))
        }
    }
}
