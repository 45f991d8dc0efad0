use std::sync::Arc;

use anyhow::{Error, Result};
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use lapin::message::Delivery;
use tracing::{error, info, warn};

use crate::{
    clients::rbmq::RabbitMqClient,
    config::Config,
    dispatcher::Dispatcher,
    models::{
        error::DispatchError,
        message::{DlqMessage, NotificationJob},
        outcome::AggregateResult,
    },
};

/// What the adapter tells the transport about one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AckDecision {
    /// Every channel succeeded; remove the message from the queue.
    Ack,
    /// At least one provider attempt failed; redelivery may fix it.
    Requeue,
    /// Redelivery can never fix this message; route it to the failed queue.
    DeadLetter { reason: String },
}

/// Translates one raw queue payload into an ack/requeue/dead-letter
/// decision. Holds no state across messages.
pub async fn process_payload(dispatcher: &Dispatcher, payload: &[u8]) -> AckDecision {
    let job = match serde_json::from_slice::<NotificationJob>(payload) {
        Ok(job) => job,
        Err(e) => {
            // A malformed payload will never deserialize on redelivery.
            return AckDecision::DeadLetter {
                reason: DispatchError::from(e).to_string(),
            };
        }
    };

    decision_for(dispatcher.dispatch(&job).await)
}

fn decision_for(result: Result<AggregateResult, DispatchError>) -> AckDecision {
    match result {
        Ok(aggregate) if aggregate.success => AckDecision::Ack,
        Ok(aggregate) => {
            if aggregate.has_delivery_failure() {
                AckDecision::Requeue
            } else {
                // Every failure was an unconfigured channel; the same
                // misconfiguration persists across redeliveries.
                AckDecision::DeadLetter {
                    reason: aggregate.message,
                }
            }
        }
        Err(e) if e.is_retryable() => AckDecision::Requeue,
        Err(e) => AckDecision::DeadLetter {
            reason: e.to_string(),
        },
    }
}

/// Consumes the notification queue until the stream ends, processing up to
/// `worker_concurrency` deliveries at a time. Messages may complete out of
/// order; each carries its own ack state and nothing else is shared.
pub async fn run_worker(
    config: &Config,
    rabbitmq: Arc<RabbitMqClient>,
    dispatcher: Arc<Dispatcher>,
) -> Result<(), Error> {
    let consumer = rabbitmq.create_consumer().await?;

    info!(concurrency = config.worker_concurrency, "Dispatch worker started");

    consumer
        .for_each_concurrent(config.worker_concurrency, |delivery| {
            let rabbitmq = Arc::clone(&rabbitmq);
            let dispatcher = Arc::clone(&dispatcher);

            async move {
                match delivery {
                    Ok(delivery) => handle_delivery(&rabbitmq, &dispatcher, delivery).await,
                    Err(e) => warn!(error = %e, "Failed to receive delivery"),
                }
            }
        })
        .await;

    Ok(())
}

async fn handle_delivery(rabbitmq: &RabbitMqClient, dispatcher: &Dispatcher, delivery: Delivery) {
    let delivery_tag = delivery.delivery_tag;
    let decision = process_payload(dispatcher, &delivery.data).await;

    let applied = match decision {
        AckDecision::Ack => rabbitmq.acknowledge(delivery_tag).await,
        AckDecision::Requeue => {
            info!(delivery_tag, "Dispatch incomplete, returning message for redelivery");
            rabbitmq.reject(delivery_tag, true).await
        }
        AckDecision::DeadLetter { reason } => {
            warn!(delivery_tag, reason = %reason, "Dead-lettering message");

            let dlq_message = DlqMessage {
                original_payload: String::from_utf8_lossy(&delivery.data).into_owned(),
                failure_reason: reason,
                failed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            };

            match rabbitmq.publish_to_dlq(&dlq_message).await {
                Ok(()) => rabbitmq.reject(delivery_tag, false).await,
                // Keep the message in the queue rather than dropping it when
                // the failed queue is unreachable.
                Err(e) => {
                    error!(error = %e, "Failed to publish to dlq, requeueing instead");
                    rabbitmq.reject(delivery_tag, true).await
                }
            }
        }
    };

    if let Err(e) = applied {
        error!(delivery_tag, error = %e, "Failed to settle delivery with broker");
    }
}
