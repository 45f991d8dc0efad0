use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

fn default_send_timeout_seconds() -> u64 {
    15
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,
    pub notification_queue_name: String,
    pub failed_queue_name: String,
    pub prefetch_count: u16,

    pub worker_concurrency: usize,

    pub server_port: u16,

    #[serde(default = "default_send_timeout_seconds")]
    pub send_timeout_seconds: u64,

    // Provider credentials are all optional: a variant is registered only
    // when its block is present, and a channel with no registered provider
    // surfaces as unconfigured at resolution time.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_use_tls: Option<bool>,
    pub smtp_from_email: Option<String>,

    pub sendgrid_api_key: Option<String>,
    pub sendgrid_from_email: Option<String>,

    pub ses_region: Option<String>,
    pub ses_from_email: Option<String>,

    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_sms_from: Option<String>,
    pub twilio_whatsapp_from: Option<String>,

    pub vonage_api_key: Option<String>,
    pub vonage_api_secret: Option<String>,
    pub vonage_sms_from: Option<String>,

    pub sns_region: Option<String>,
    pub sns_sender_id: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_seconds)
    }
}
