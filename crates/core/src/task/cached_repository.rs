//! Cache-aside task repository
//!
//! Reads by id are served from the cache when possible and fall back to the
//! SQL store on a miss, populating the cache afterwards. Listings always go
//! to the store. Writes go to the store first, then invalidate the cached
//! copy on a best-effort basis: a failed invalidation is logged and leaves a
//! stale entry that expires with its TTL.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument, warn};

use super::model::{NewTask, Pagination, Task, TaskFilter, TaskPage};
use super::repository::TaskRepository;
use crate::cache::{CacheProvider, CacheService};
use crate::store::SqlTaskStore;
use crate::{Error, Result};

/// Cache key for a task id
pub fn cache_key(id: i64) -> String {
    format!("task:{}", id)
}

/// Task repository composing the SQL store with a cache
pub struct CachedTaskRepository<C = CacheProvider> {
    store: SqlTaskStore,
    cache: C,
    ttl: Duration,
}

impl<C: CacheService> CachedTaskRepository<C> {
    pub fn new(store: SqlTaskStore, cache: C, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    pub fn store(&self) -> &SqlTaskStore {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Look up a cached copy; any cache failure counts as a miss
    async fn cached(&self, id: i64) -> Option<Task> {
        let key = cache_key(id);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding undecodable cached task");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read degraded, falling back to store");
                None
            }
        }
    }

    async fn populate(&self, task: &Task) {
        let key = cache_key(task.id);
        let value = match serde_json::to_string(task) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode task for cache");
                return;
            }
        };

        if let Err(e) = self.cache.set(&key, &value, self.ttl).await {
            warn!(key = %key, error = %e, "Cache write degraded, task not cached");
        }
    }

    async fn invalidate(&self, id: i64) {
        let key = cache_key(id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(
                key = %key,
                error = %e,
                "Cache invalidation failed, stale entry lives until TTL expiry"
            );
        }
    }
}

#[async_trait]
impl<C: CacheService + 'static> TaskRepository for CachedTaskRepository<C> {
    #[instrument(skip(self, task), fields(title = %task.title))]
    async fn create(&self, task: NewTask) -> Result<Task> {
        task.validate()?;
        let created = self.store.insert(&task, Utc::now()).await?;
        debug!(id = created.id, "Created task");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Task> {
        if let Some(task) = self.cached(id).await {
            debug!(id, "Served task from cache");
            return Ok(task);
        }

        let task = self.store.fetch(id).await?.ok_or(Error::NotFound(id))?;
        self.populate(&task).await;
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &TaskFilter, pagination: Pagination) -> Result<TaskPage> {
        pagination.validate()?;

        let total = self.store.count(filter).await?;
        let tasks = self.store.fetch_page(filter, pagination).await?;

        Ok(TaskPage {
            tasks,
            total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    #[instrument(skip(self, task), fields(id = task.id))]
    async fn update(&self, task: Task) -> Result<Task> {
        if task.title.trim().is_empty() {
            return Err(Error::validation("title cannot be empty"));
        }

        // updated_at never moves backwards, even if the clock does
        let now = Utc::now().max(task.updated_at);
        let updated = self.store.update(&task, now).await?;
        self.invalidate(task.id).await;

        updated.ok_or(Error::NotFound(task.id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<()> {
        let removed = self.store.delete(id).await?;
        self.invalidate(id).await;

        if removed {
            debug!(id, "Deleted task");
            Ok(())
        } else {
            Err(Error::NotFound(id))
        }
    }
}
