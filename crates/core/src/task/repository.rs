//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::{NewTask, Pagination, Task, TaskFilter, TaskPage};
use crate::Result;

/// Repository interface for task CRUD operations
///
/// Implementations are the sole writers of persisted tasks and of any
/// cached copies of them.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task; the store assigns the id and both timestamps
    async fn create(&self, task: NewTask) -> Result<Task>;

    /// Get a task by ID, failing with `NotFound` if it does not exist
    async fn get(&self, id: i64) -> Result<Task>;

    /// List one page of tasks matching the filter, with the total match count
    async fn list(&self, filter: &TaskFilter, pagination: Pagination) -> Result<TaskPage>;

    /// Replace the mutable fields of an existing task
    async fn update(&self, task: Task) -> Result<Task>;

    /// Delete a task by ID
    async fn delete(&self, id: i64) -> Result<()>;
}
