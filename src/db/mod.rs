//! Database layer
//!
//! Galleria ships as a single binary backed by SQLite. This module
//! provides pool creation, embedded code-based migrations, and the
//! repository implementations for each entity.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DbPool};
