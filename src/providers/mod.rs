pub mod sendgrid;
pub mod ses;
pub mod smtp;
pub mod sns;
pub mod twilio;
pub mod vonage;

pub use sendgrid::SendGridMailer;
pub use ses::SesMailer;
pub use smtp::SmtpMailer;
pub use sns::SnsSmsSender;
pub use twilio::{TwilioSmsSender, TwilioWhatsAppSender};
pub use vonage::VonageSmsSender;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    config::Config,
    models::{
        channel::{Channel, ProviderDescriptor},
        error::DispatchError,
        message::NotificationJob,
        outcome::ProviderResult,
    },
};

/// Uniform send contract over the external delivery services. Each
/// implementation handles exactly one channel; the descriptor is the
/// declaration the resolver keys its route table on.
///
/// A provider must not return an accepted result unless the upstream
/// acknowledged the message.
#[async_trait]
pub trait Provider: Send + Sync {
    fn descriptor(&self) -> ProviderDescriptor;

    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Pure predicate over the declared channel, used only while the route
    /// table is being built.
    fn supports(&self, channel: Channel) -> bool {
        self.descriptor().channel == channel
    }

    async fn send(&self, job: &NotificationJob) -> Result<ProviderResult, DispatchError>;
}

/// Instantiates every provider variant whose configuration block is present.
/// The order here is the registration order the resolver's first-wins rule
/// operates on, so it must stay deterministic.
pub async fn build_registry(config: &Config) -> Vec<Arc<dyn Provider>> {
    let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

    if let (Some(host), Some(from)) = (&config.smtp_host, &config.smtp_from_email) {
        providers.push(Arc::new(SmtpMailer::new(
            host.clone(),
            config.smtp_port.unwrap_or(587),
            from.clone(),
            config.smtp_username.clone(),
            config.smtp_password.clone(),
            config.smtp_use_tls.unwrap_or(false),
        )));
    }

    if let (Some(api_key), Some(from)) = (&config.sendgrid_api_key, &config.sendgrid_from_email) {
        providers.push(Arc::new(SendGridMailer::new(api_key.clone(), from.clone())));
    }

    if let Some(from) = &config.ses_from_email {
        providers.push(Arc::new(
            SesMailer::from_env(config.ses_region.clone(), from.clone()).await,
        ));
    }

    if let (Some(sid), Some(token), Some(from)) = (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_sms_from,
    ) {
        providers.push(Arc::new(TwilioSmsSender::new(
            sid.clone(),
            token.clone(),
            from.clone(),
        )));
    }

    if let (Some(api_key), Some(api_secret), Some(from)) = (
        &config.vonage_api_key,
        &config.vonage_api_secret,
        &config.vonage_sms_from,
    ) {
        providers.push(Arc::new(VonageSmsSender::new(
            api_key.clone(),
            api_secret.clone(),
            from.clone(),
        )));
    }

    if let Some(region) = &config.sns_region {
        providers.push(Arc::new(
            SnsSmsSender::from_env(region.clone(), config.sns_sender_id.clone()).await,
        ));
    }

    if let (Some(sid), Some(token), Some(from)) = (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_whatsapp_from,
    ) {
        providers.push(Arc::new(TwilioWhatsAppSender::new(
            sid.clone(),
            token.clone(),
            from.clone(),
        )));
    }

    for provider in &providers {
        let descriptor = provider.descriptor();
        info!(
            provider = descriptor.name,
            channel = %descriptor.channel,
            "Provider registered"
        );
    }

    providers
}
