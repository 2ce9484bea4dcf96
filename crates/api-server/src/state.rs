//! Application state

use std::sync::Arc;

use tasklist_core::cache::CacheProvider;
use tasklist_core::store::SqlTaskStore;
use tasklist_core::task::{CachedTaskRepository, TaskService};

use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    tasks: TaskService,
    store: SqlTaskStore,
    cache: CacheProvider,
}

impl AppState {
    /// Connect the store and cache described by `config`
    ///
    /// Store failures are fatal; an unreachable cache degrades to no caching.
    pub async fn from_config(config: &AppConfig) -> tasklist_core::Result<Self> {
        let store = SqlTaskStore::connect(&config.store).await?;
        store.migrate().await?;
        let cache = CacheProvider::from_config_graceful(&config.cache).await;

        Ok(Self::with_parts(store, cache, config.cache.ttl))
    }

    /// Assemble state from an already prepared store and cache
    pub fn with_parts(store: SqlTaskStore, cache: CacheProvider, ttl: std::time::Duration) -> Self {
        let repo = CachedTaskRepository::new(store.clone(), cache.clone(), ttl);
        let tasks = TaskService::new(Arc::new(repo));

        Self {
            inner: Arc::new(AppStateInner {
                tasks,
                store,
                cache,
            }),
        }
    }

    pub fn tasks(&self) -> &TaskService {
        &self.inner.tasks
    }

    pub fn store(&self) -> &SqlTaskStore {
        &self.inner.store
    }

    pub fn cache(&self) -> &CacheProvider {
        &self.inner.cache
    }
}
