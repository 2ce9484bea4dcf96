//! Cache module
//!
//! Key/value cache with TTL expiry, used as a side-channel accelerator in
//! front of the task store. The cache is never the source of truth: every
//! failure here is reported as a [`CacheError`] and absorbed by callers.
//!
//! ```text
//! CacheProvider (enum)
//!   ├── Redis(RedisCacheService)    shared across processes
//!   ├── Memory(MemoryCacheService)  in-process, per instance
//!   └── NoOp(NoOpCacheService)      always miss, always succeed
//! ```

mod config;
mod error;
mod provider;
mod providers;
mod service;

pub use config::{CacheBackend, CacheConfig};
pub use error::{CacheError, CacheResult};
pub use provider::CacheProvider;
pub use providers::{redact_url, MemoryCacheService, NoOpCacheService, RedisCacheService};
pub use service::CacheService;
