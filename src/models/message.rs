use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::channel::Channel;

/// A notification job as it arrives from the queue. Built once at the queue
/// boundary and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationJob {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    pub channels: Vec<Channel>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub template_code: Option<String>,

    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,

    pub origin: String,

    #[serde(default)]
    pub trace_id: Option<String>,
}

impl NotificationJob {
    /// Requested channels with duplicates collapsed, first occurrence wins.
    pub fn requested_channels(&self) -> Vec<Channel> {
        let mut seen = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            if !seen.contains(channel) {
                seen.push(*channel);
            }
        }
        seen
    }

    /// The recipient field a channel delivers to.
    pub fn recipient_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms | Channel::Whatsapp => self.phone.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqMessage {
    pub original_payload: String,
    pub failure_reason: String,
    pub failed_at: String,
}
