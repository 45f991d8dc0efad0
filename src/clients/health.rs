use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::rbmq::RabbitMqClient,
    config::Config,
    models::{
        channel::Channel,
        health::{HealthCheckResponse, HealthStatus, ServiceHealth},
    },
    resolver::ProviderResolver,
};

pub struct HealthChecker {
    config: Config,
    resolver: Arc<ProviderResolver>,
}

impl HealthChecker {
    pub fn new(config: Config, resolver: Arc<ProviderResolver>) -> Self {
        Self { config, resolver }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        let broker_health = self.check_rabbitmq().await;
        checks.insert("message_broker".to_string(), broker_health);

        for (name, health) in self.check_channel_routes() {
            checks.insert(name, health);
        }

        let overall_status = determine_overall_status(&checks);

        HealthCheckResponse {
            status: overall_status,
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            checks,
        }
    }

    async fn check_rabbitmq(&self) -> ServiceHealth {
        let start = Instant::now();

        match RabbitMqClient::connect(&self.config).await {
            Ok(_) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(response_time_ms = elapsed, "RabbitMQ health check passed");
                ServiceHealth::healthy(elapsed)
            }
            Err(e) => {
                warn!(error = %e, "RabbitMQ connection failed");
                ServiceHealth::unhealthy(format!("Connection failed: {}", e))
            }
        }
    }

    /// One check entry per channel: healthy when a provider routes it,
    /// degraded when unconfigured. An unconfigured channel only affects jobs
    /// that request it, so it does not fail the whole service.
    fn check_channel_routes(&self) -> Vec<(String, ServiceHealth)> {
        let routed: HashMap<Channel, String> =
            self.resolver.configured_channels().into_iter().collect();

        Channel::ALL
            .iter()
            .map(|channel| {
                let name = format!("channel_{}", channel);

                let health = match routed.get(channel) {
                    Some(provider) => ServiceHealth::routed(provider.clone()),
                    None => ServiceHealth::unrouted(format!(
                        "no provider configured for channel {}",
                        channel
                    )),
                };

                (name, health)
            })
            .collect()
    }
}

fn determine_overall_status(checks: &HashMap<String, ServiceHealth>) -> HealthStatus {
    let has_unhealthy = checks
        .values()
        .any(|health| health.status == HealthStatus::Unhealthy);

    let has_degraded = checks
        .values()
        .any(|health| health.status == HealthStatus::Degraded);

    if has_unhealthy {
        HealthStatus::Unhealthy
    } else if has_degraded {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}
