//! Store module
//!
//! Durable task storage. The store executes parameterized statements and
//! owns no business rules; caching and merge policy live above it.

mod sql;

pub use sql::{SqlTaskStore, StoreConfig};
