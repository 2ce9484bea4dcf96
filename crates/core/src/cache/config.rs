//! Cache configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which cache provider to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    Redis,
    #[default]
    Memory,
    Disabled,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" | "moka" => Ok(Self::Memory),
            "none" | "disabled" | "off" => Ok(Self::Disabled),
            other => Err(format!(
                "unknown cache backend {:?} (expected redis, memory or none)",
                other
            )),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Redis => "redis",
            Self::Memory => "memory",
            Self::Disabled => "none",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: String,
    /// Lifetime of a cached task entry
    pub ttl: Duration,
    /// Entry bound for the in-process provider
    pub max_capacity: u64,
}

impl CacheConfig {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            ttl: Self::DEFAULT_TTL,
            max_capacity: 10_000,
        }
    }
}
