use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::{
    models::{channel::Channel, error::DispatchError},
    providers::Provider,
};

/// Routes channels to providers. The route table is built lazily on the
/// first resolution request and cached for the process lifetime; `OnceLock`
/// guarantees exactly one build under concurrent first access and publishes
/// the finished map to every caller. Rebuilds happen only on restart.
pub struct ProviderResolver {
    providers: Vec<Arc<dyn Provider>>,
    routes: OnceLock<HashMap<Channel, Arc<dyn Provider>>>,
}

impl ProviderResolver {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self {
            providers,
            routes: OnceLock::new(),
        }
    }

    pub fn resolve(&self, channel: Channel) -> Result<Arc<dyn Provider>, DispatchError> {
        let routes = self.routes.get_or_init(|| self.build_routes());

        routes
            .get(&channel)
            .cloned()
            .ok_or(DispatchError::ProviderNotConfigured(channel))
    }

    /// Channels that currently resolve to a provider, with the provider name.
    pub fn configured_channels(&self) -> Vec<(Channel, String)> {
        let routes = self.routes.get_or_init(|| self.build_routes());

        Channel::ALL
            .iter()
            .filter_map(|channel| {
                routes
                    .get(channel)
                    .map(|provider| (*channel, provider.name().to_string()))
            })
            .collect()
    }

    fn build_routes(&self) -> HashMap<Channel, Arc<dyn Provider>> {
        let mut routes: HashMap<Channel, Arc<dyn Provider>> = HashMap::new();
        let mut conflicts: HashMap<Channel, Vec<&'static str>> = HashMap::new();

        for provider in &self.providers {
            let descriptor = provider.descriptor();

            match routes.entry(descriptor.channel) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(provider));
                }
                Entry::Occupied(_) => {
                    conflicts
                        .entry(descriptor.channel)
                        .or_default()
                        .push(descriptor.name);
                }
            }
        }

        // One warning per conflicted channel, regardless of how many extra
        // providers declared it. The first registered provider stays in use.
        for (channel, ignored) in conflicts {
            let kept = routes
                .get(&channel)
                .map(|p| p.name())
                .unwrap_or("unknown");

            warn!(
                channel = %channel,
                kept,
                ignored = %ignored.join(", "),
                "Multiple providers registered for channel, keeping the first"
            );
        }

        for (channel, provider) in &routes {
            info!(channel = %channel, provider = provider.name(), "Channel route established");
        }

        routes
    }
}
