//! Map-backed provider registry

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::ChannelType;

use super::traits::{ChannelProvider, ProviderRegistry};

/// Registry filled once at startup and read on every send
#[derive(Default)]
pub struct StaticProviderRegistry {
    providers: RwLock<HashMap<(String, ChannelType), Arc<dyn ChannelProvider>>>,
}

impl StaticProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` for `tenant_id` under its own channel type
    ///
    /// Returns the provider it replaced, if any.
    pub fn register(
        &self,
        tenant_id: impl Into<String>,
        provider: Arc<dyn ChannelProvider>,
    ) -> Option<Arc<dyn ChannelProvider>> {
        let key = (tenant_id.into(), provider.channel_type());
        self.providers.write().insert(key, provider)
    }

    pub fn unregister(&self, tenant_id: &str, channel: ChannelType) -> Option<Arc<dyn ChannelProvider>> {
        self.providers.write().remove(&(tenant_id.to_string(), channel))
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl ProviderRegistry for StaticProviderRegistry {
    fn resolve(&self, tenant_id: &str, channel: ChannelType) -> Option<Arc<dyn ChannelProvider>> {
        self.providers
            .read()
            .get(&(tenant_id.to_string(), channel))
            .cloned()
    }

    fn stateful_providers(&self) -> Vec<(String, Arc<dyn ChannelProvider>)> {
        self.providers
            .read()
            .iter()
            .filter(|((_, channel), _)| channel.has_expiring_credentials())
            .map(|((tenant_id, _), provider)| (tenant_id.clone(), provider.clone()))
            .collect()
    }
}
