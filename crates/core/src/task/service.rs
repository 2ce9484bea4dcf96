//! Task service
//!
//! Thin orchestration over a [`TaskRepository`]. The only rule it adds is
//! merge-on-update: a partial change is applied over the current task before
//! the full record is written back.

use std::sync::Arc;

use tracing::instrument;

use super::model::{NewTask, Pagination, Task, TaskFilter, TaskPage, TaskPatch};
use super::repository::TaskRepository;
use crate::Result;

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, task: NewTask) -> Result<Task> {
        self.repo.create(task).await
    }

    pub async fn get(&self, id: i64) -> Result<Task> {
        self.repo.get(id).await
    }

    pub async fn list(&self, filter: &TaskFilter, pagination: Pagination) -> Result<TaskPage> {
        self.repo.list(filter, pagination).await
    }

    /// Apply a partial change to an existing task
    ///
    /// Fails with `NotFound` before anything is written if the task is gone.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task> {
        let existing = self.repo.get(id).await?;
        let merged = patch.apply_to(&existing);
        self.repo.update(merged).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await
    }
}
