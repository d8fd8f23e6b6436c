//! Database migrations
//!
//! Code-based migrations embedded directly as SQL strings, applied in
//! version order and tracked in a `schema_migrations` table. Embedding
//! the SQL keeps deployment to a single binary.

use anyhow::{Context, Result};
use chrono::Utc;

use super::DbPool;

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// All migrations for Galleria.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
        "#,
    },
    Migration {
        version: 2,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    Migration {
        version: 3,
        name: "create_gallery_categories",
        up: r#"
            CREATE TABLE IF NOT EXISTS gallery_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 4,
        name: "create_gallery_items",
        up: r#"
            CREATE TABLE IF NOT EXISTS gallery_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                description TEXT,
                image_url TEXT NOT NULL,
                category_id INTEGER,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (category_id) REFERENCES gallery_categories(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_gallery_items_category_id ON gallery_items(category_id);
        "#,
    },
];

/// Run all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    ensure_migrations_table(pool).await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    for migration in MIGRATIONS {
        if applied.contains(&(migration.version as i64)) {
            continue;
        }

        for statement in split_sql_statements(migration.up) {
            sqlx::query(&statement).execute(pool).await.with_context(|| {
                format!(
                    "Migration {} ({}) failed on statement: {}",
                    migration.version, migration.name, statement
                )
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version as i64)
            .bind(migration.name)
            .bind(Utc::now())
            .execute(pool)
            .await
            .context("Failed to record migration")?;

        tracing::info!("Applied migration {}: {}", migration.version, migration.name);
    }

    Ok(())
}

async fn ensure_migrations_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

/// Split a migration's SQL into individual statements, dropping
/// comment-only fragments.
fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_comment_only(s))
        .map(String::from)
        .collect()
}

fn is_comment_only(statement: &str) -> bool {
    statement
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}
