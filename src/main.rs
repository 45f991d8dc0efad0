use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use dispatch_service::{
    api, clients::rbmq::RabbitMqClient, config::Config, consumer, dispatcher::Dispatcher,
    providers, resolver::ProviderResolver, utils::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::load()?;

    let registry = providers::build_registry(&config).await;
    let resolver = Arc::new(ProviderResolver::new(registry));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&resolver),
        config.send_timeout(),
    ));

    let rabbitmq = Arc::new(RabbitMqClient::connect(&config).await?);

    info!("Dispatch service starting");

    tokio::select! {
        result = api::run_api_server(config.clone(), Arc::clone(&resolver)) => {
            result.map_err(|e| anyhow!("API server exited: {}", e))
        }
        result = consumer::run_worker(&config, rabbitmq, dispatcher) => {
            result
        }
    }
}
