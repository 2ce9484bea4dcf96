//! Cache service trait definition

use std::future::Future;
use std::time::Duration;

use super::error::CacheResult;

/// Operations every cache provider supports
///
/// Values are opaque strings; callers own the encoding.
pub trait CacheService: Send + Sync {
    /// Get a value by key
    ///
    /// Returns `Ok(Some(value))` on a hit and `Ok(None)` on a miss or expiry.
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<String>>> + Send;

    /// Set a value that expires after `ttl`
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = CacheResult<()>> + Send;

    /// Delete a key; deleting an absent key succeeds
    fn delete(&self, key: &str) -> impl Future<Output = CacheResult<()>> + Send;

    /// Check whether the backend is reachable
    fn health_check(&self) -> impl Future<Output = CacheResult<bool>> + Send;

    fn provider_name(&self) -> &'static str;
}
