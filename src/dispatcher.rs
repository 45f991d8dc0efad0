use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    models::{
        channel::Channel,
        error::DispatchError,
        message::NotificationJob,
        outcome::{AggregateResult, DispatchOutcome},
        validation::validate_job,
    },
    resolver::ProviderResolver,
    utils::mask_optional,
};

/// Orchestrates one dispatch attempt: resolves a provider per requested
/// channel, invokes the send under a timeout, and folds the per-channel
/// outcomes into an aggregate. Channels are isolated from each other; only a
/// structurally invalid job fails the whole attempt.
///
/// The dispatcher never retries a send. Redelivery from the queue is the
/// only retry mechanism, at job granularity, so re-entrant invocation with
/// the same job must stay safe.
pub struct Dispatcher {
    resolver: Arc<ProviderResolver>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(resolver: Arc<ProviderResolver>, send_timeout: Duration) -> Self {
        Self {
            resolver,
            send_timeout,
        }
    }

    pub async fn dispatch(&self, job: &NotificationJob) -> Result<AggregateResult, DispatchError> {
        validate_job(job)?;

        let channels = job.requested_channels();

        info!(
            origin = %job.origin,
            channels = ?channels,
            email = %mask_optional(job.email.as_deref()),
            phone = %mask_optional(job.phone.as_deref()),
            "Dispatching notification job"
        );

        let mut outcomes = Vec::with_capacity(channels.len());

        for channel in channels {
            let outcome = self.dispatch_channel(job, channel).await;

            if outcome.succeeded {
                info!(
                    channel = %outcome.channel,
                    provider = outcome.provider.as_deref().unwrap_or("-"),
                    recipient = %mask_optional(job.recipient_for(channel)),
                    "Channel delivered"
                );
            } else {
                warn!(
                    channel = %outcome.channel,
                    provider = outcome.provider.as_deref().unwrap_or("-"),
                    recipient = %mask_optional(job.recipient_for(channel)),
                    reason = %outcome.message,
                    "Channel delivery failed"
                );
            }

            outcomes.push(outcome);
        }

        Ok(AggregateResult::from_outcomes(outcomes))
    }

    async fn dispatch_channel(&self, job: &NotificationJob, channel: Channel) -> DispatchOutcome {
        let provider = match self.resolver.resolve(channel) {
            Ok(provider) => provider,
            Err(_) => return DispatchOutcome::unresolved(channel),
        };

        match timeout(self.send_timeout, provider.send(job)).await {
            Ok(Ok(result)) if result.success => {
                DispatchOutcome::delivered(channel, provider.name(), result.message)
            }
            Ok(Ok(result)) => DispatchOutcome::failed(channel, provider.name(), result.message),
            Ok(Err(e)) => DispatchOutcome::failed(channel, provider.name(), e.to_string()),
            Err(_) => DispatchOutcome::failed(
                channel,
                provider.name(),
                format!("send timed out after {:?}", self.send_timeout),
            ),
        }
    }
}
