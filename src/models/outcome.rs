use serde::{Deserialize, Serialize};

use crate::models::channel::Channel;

/// What a provider reports back for one send attempt. `success` is false when
/// the upstream completed the call but rejected the message.
#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub success: bool,
    pub message: String,
}

impl ProviderResult {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Per-channel result of one dispatch attempt. `provider` is None when no
/// provider could be resolved for the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub channel: Channel,
    pub succeeded: bool,
    pub provider: Option<String>,
    pub message: String,
}

impl DispatchOutcome {
    pub fn delivered(channel: Channel, provider: &str, message: String) -> Self {
        Self {
            channel,
            succeeded: true,
            provider: Some(provider.to_string()),
            message,
        }
    }

    pub fn failed(channel: Channel, provider: &str, message: String) -> Self {
        Self {
            channel,
            succeeded: false,
            provider: Some(provider.to_string()),
            message,
        }
    }

    pub fn unresolved(channel: Channel) -> Self {
        Self {
            channel,
            succeeded: false,
            provider: None,
            message: format!("no provider configured for channel {}", channel),
        }
    }
}

/// Aggregate of every per-channel outcome for one job. `success` holds only
/// when every requested channel succeeded; partial failure stays visible in
/// `outcomes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub success: bool,
    pub outcomes: Vec<DispatchOutcome>,
    pub message: String,
}

impl AggregateResult {
    pub fn from_outcomes(outcomes: Vec<DispatchOutcome>) -> Self {
        let total = outcomes.len();
        let failed = outcomes.iter().filter(|o| !o.succeeded).count();
        let success = failed == 0;

        let message = if success {
            format!("all {} channel(s) delivered", total)
        } else {
            format!("{} of {} channel(s) failed", failed, total)
        };

        Self {
            success,
            outcomes,
            message,
        }
    }

    /// True when at least one failure was an actual provider attempt, as
    /// opposed to a channel that never resolved to a provider.
    pub fn has_delivery_failure(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| !o.succeeded && o.provider.is_some())
    }
}
