//! Core library for the task-list record store
//!
//! This crate contains the data access layer, including:
//! - Task model and partial-update merge rules
//! - SQL-backed task store
//! - Cache providers (Redis, in-process, no-op)
//! - Cache-aside task repository and the task service above it

pub mod cache;
pub mod error;
pub mod store;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
