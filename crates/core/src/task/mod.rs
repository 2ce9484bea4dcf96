//! Task module
//!
//! This module contains the task model, the repository contract, its
//! cache-aside implementation and the service that applies partial updates.

mod cached_repository;
mod model;
mod repository;
mod service;

pub use cached_repository::{cache_key, CachedTaskRepository};
pub use model::*;
pub use repository::TaskRepository;
pub use service::TaskService;
