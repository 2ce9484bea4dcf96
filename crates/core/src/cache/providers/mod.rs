//! Cache provider implementations

mod memory;
mod noop;
mod redis;

pub use self::memory::MemoryCacheService;
pub use self::noop::NoOpCacheService;
pub use self::redis::{redact_url, RedisCacheService};
