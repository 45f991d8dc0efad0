use thiserror::Error;

use crate::models::channel::Channel;

/// Error taxonomy for the dispatch path. Per-channel failures are recovered
/// into `DispatchOutcome`s by the orchestrator; only the fatal classes
/// (validation, deserialization) reach the transport boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Structurally invalid job. Redelivering it can never succeed.
    #[error("invalid notification job: {0}")]
    Validation(String),

    /// No registered provider declares the requested channel.
    #[error("no provider configured for channel {0}")]
    ProviderNotConfigured(Channel),

    /// The external provider call could not be completed.
    #[error("delivery via {provider} failed: {reason}")]
    Delivery { provider: String, reason: String },

    /// The queue payload did not deserialize into a job.
    #[error("failed to deserialize queue payload: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl DispatchError {
    pub fn delivery(provider: &str, reason: impl Into<String>) -> Self {
        DispatchError::Delivery {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether queue redelivery has any chance of fixing this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::Delivery { .. } => true,
            DispatchError::Validation(_)
            | DispatchError::ProviderNotConfigured(_)
            | DispatchError::Deserialization(_) => false,
        }
    }
}
