//! Server configuration read from the environment

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tasklist_core::cache::{CacheBackend, CacheConfig};
use tasklist_core::store::StoreConfig;

/// Top-level configuration for the api-server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_defaults = StoreConfig::default();
        let cache_defaults = CacheConfig::default();

        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let store = StoreConfig {
            url: lookup("DATABASE_URL").unwrap_or(store_defaults.url),
            max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                store_defaults.max_connections,
            )?,
        };

        let backend = match lookup("CACHE_BACKEND") {
            Some(raw) => raw
                .parse::<CacheBackend>()
                .map_err(|e| anyhow!(e))
                .context("invalid CACHE_BACKEND")?,
            None => cache_defaults.backend,
        };
        let ttl_secs = parse_or(&lookup, "CACHE_TTL_SECS", cache_defaults.ttl.as_secs())?;

        let cache = CacheConfig {
            backend,
            redis_url: lookup("REDIS_URL").unwrap_or(cache_defaults.redis_url),
            ttl: Duration::from_secs(ttl_secs),
            max_capacity: parse_or(&lookup, "CACHE_MAX_CAPACITY", cache_defaults.max_capacity)?,
        };

        Ok(Self {
            bind_addr,
            store,
            cache,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {}={:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}
