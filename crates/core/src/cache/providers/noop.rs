//! No-op cache provider
//!
//! Always misses and always succeeds. Used when caching is disabled or when
//! Redis is unreachable at startup.

use std::time::Duration;

use crate::cache::error::CacheResult;
use crate::cache::service::CacheService;

#[derive(Debug, Clone, Default)]
pub struct NoOpCacheService;

impl NoOpCacheService {
    pub fn new() -> Self {
        Self
    }
}

impl CacheService for NoOpCacheService {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_never_stores() {
        let svc = NoOpCacheService::new();
        svc.set("task:1", "{}", Duration::from_secs(60)).await.unwrap();
        assert_eq!(svc.get("task:1").await.unwrap(), None);
        svc.delete("task:1").await.unwrap();
        assert!(svc.health_check().await.unwrap());
        assert_eq!(svc.provider_name(), "noop");
    }
}
