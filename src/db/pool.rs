//! Database connection pool
//!
//! Creates the SQLite pool from configuration, normalizing file paths
//! to connection URLs and creating parent directories as needed.

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Connection pool used throughout the application
pub type DbPool = SqlitePool;

/// Create the SQLite connection pool from configuration.
///
/// File-based databases are created on first connect and foreign keys
/// are enabled for every connection in the pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let url = &config.url;

    // Ensure the database directory exists for file-based SQLite
    if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
        let path = url.strip_prefix("sqlite:").unwrap_or(url);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }
    }

    let in_memory = url == ":memory:" || url.starts_with("sqlite::memory:");

    let connection_url = if in_memory {
        "sqlite::memory:".to_string()
    } else if url.starts_with("sqlite:") {
        url.to_string()
    } else {
        format!("sqlite:{}", url)
    };

    // Foreign keys are set per connection, so they belong in the
    // connect options rather than a one-off PRAGMA.
    let connect_options = SqliteConnectOptions::from_str(&connection_url)
        .with_context(|| format!("Invalid SQLite URL: {}", url))?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database exists per connection, so the pool must be
    // pinned to a single connection that is never reaped.
    let options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(20)
    };

    let pool = options
        .connect_with(connect_options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    Ok(pool)
}

/// Create an in-memory pool for tests
pub async fn create_test_pool() -> Result<DbPool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}
