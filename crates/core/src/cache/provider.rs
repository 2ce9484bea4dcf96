//! Cache provider selected from configuration
//!
//! Enum dispatch over the concrete providers, so repositories can be generic
//! over [`CacheService`] without boxing futures.

use std::time::Duration;

use tracing::{info, warn};

use super::config::{CacheBackend, CacheConfig};
use super::error::CacheResult;
use super::providers::{redact_url, MemoryCacheService, NoOpCacheService, RedisCacheService};
use super::service::CacheService;

#[derive(Debug, Clone)]
enum Backend {
    Redis(Box<RedisCacheService>),
    Memory(MemoryCacheService),
    NoOp(NoOpCacheService),
}

#[derive(Debug, Clone)]
pub struct CacheProvider {
    backend: Backend,
}

impl CacheProvider {
    /// Build the configured provider, degrading to no-op on failure
    ///
    /// An unreachable Redis logs a warning instead of failing startup.
    pub async fn from_config_graceful(config: &CacheConfig) -> Self {
        let backend = match config.backend {
            CacheBackend::Redis => match RedisCacheService::connect(&config.redis_url).await {
                Ok(service) => {
                    info!(url = %redact_url(&config.redis_url), "Using Redis task cache");
                    Backend::Redis(Box::new(service))
                }
                Err(e) => {
                    warn!(
                        url = %redact_url(&config.redis_url),
                        error = %e,
                        "Redis unavailable, task cache disabled"
                    );
                    Backend::NoOp(NoOpCacheService::new())
                }
            },
            CacheBackend::Memory => {
                info!(
                    max_capacity = config.max_capacity,
                    ttl_seconds = config.ttl.as_secs(),
                    "Using in-memory task cache"
                );
                Backend::Memory(MemoryCacheService::new(config.max_capacity))
            }
            CacheBackend::Disabled => {
                info!("Task cache disabled");
                Backend::NoOp(NoOpCacheService::new())
            }
        };

        Self { backend }
    }

    pub fn memory(max_capacity: u64) -> Self {
        Self {
            backend: Backend::Memory(MemoryCacheService::new(max_capacity)),
        }
    }

    /// Whether reads can ever hit
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, Backend::NoOp(_))
    }
}

impl CacheService for CacheProvider {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match &self.backend {
            Backend::Redis(s) => s.get(key).await,
            Backend::Memory(s) => s.get(key).await,
            Backend::NoOp(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        match &self.backend {
            Backend::Redis(s) => s.set(key, value, ttl).await,
            Backend::Memory(s) => s.set(key, value, ttl).await,
            Backend::NoOp(s) => s.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match &self.backend {
            Backend::Redis(s) => s.delete(key).await,
            Backend::Memory(s) => s.delete(key).await,
            Backend::NoOp(s) => s.delete(key).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match &self.backend {
            Backend::Redis(s) => s.health_check().await,
            Backend::Memory(s) => s.health_check().await,
            Backend::NoOp(s) => s.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match &self.backend {
            Backend::Redis(s) => s.provider_name(),
            Backend::Memory(s) => s.provider_name(),
            Backend::NoOp(s) => s.provider_name(),
        }
    }
}
