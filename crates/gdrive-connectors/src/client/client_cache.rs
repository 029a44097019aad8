//! HTTP client caching for configuration-specific settings

use crate::config::DriveConfiguration;
use crate::error::{ConnectorError, ConnectorResult};
use once_cell::sync::Lazy;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

static GLOBAL_CACHE: Lazy<ClientCache> = Lazy::new(ClientCache::new);

/// Settings that distinguish one pooled client from another
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientConfig {
    connect_timeout_ms: u64,
    total_timeout_ms: u64,
    proxy_url: Option<String>,
}

impl ClientConfig {
    fn from_configuration(configuration: &DriveConfiguration) -> Self {
        Self {
            connect_timeout_ms: configuration.timeout_config.connect_ms,
            total_timeout_ms: configuration.timeout_config.total_ms,
            proxy_url: configuration.network_config.proxy_url.clone(),
        }
    }

    fn build_client(&self) -> ConnectorResult<Client> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .timeout(Duration::from_millis(self.total_timeout_ms))
            .user_agent(concat!("gdrive-connectors/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = &self.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                ConnectorError::InvalidConfig(format!("Invalid proxy URL {}: {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        builder.build().map_err(|e| {
            ConnectorError::InvalidConfig(format!("Failed to build HTTP client: {}", e))
        })
    }
}

/// Cache of HTTP clients so components sharing settings share connection pools
#[derive(Debug, Clone)]
pub struct ClientCache {
    cache: Arc<RwLock<HashMap<ClientConfig, Arc<Client>>>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Process-wide cache used by `DriveClient::from_configuration`
    pub fn global() -> &'static ClientCache {
        &GLOBAL_CACHE
    }

    pub fn get_client(&self, configuration: &DriveConfiguration) -> ConnectorResult<Arc<Client>> {
        let config = ClientConfig::from_configuration(configuration);

        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(client) = cache.get(&config) {
                return Ok(client.clone());
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have built it while we waited for the write lock
        if let Some(client) = cache.get(&config) {
            return Ok(client.clone());
        }

        let client = Arc::new(config.build_client()?);
        cache.insert(config, client.clone());
        tracing::debug!(cached_clients = cache.len(), "created Drive HTTP client");
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for ClientCache {
    fn default() -> Self {
        Self::new()
    }
}
