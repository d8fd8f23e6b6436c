//! User repository
//!
//! Database operations for user accounts.

use crate::db::DbPool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user, returning it with its assigned id
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Count all users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, is_admin, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        let mut created = user.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, is_admin, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by ID")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, is_admin, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;

        Ok(count)
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&User::new("alice".to_string(), "hash".to_string(), true))
            .await
            .expect("Failed to create user");

        assert!(created.id > 0);
        assert_eq!(created.username, "alice");
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = setup_test_repo().await;
        repo.create(&User::new("alice".to_string(), "hash".to_string(), false))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_username("alice")
            .await
            .expect("Lookup failed")
            .expect("User not found");
        assert!(!found.is_admin);

        assert!(repo.get_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count() {
        let repo = setup_test_repo().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.create(&User::new("alice".to_string(), "hash".to_string(), true))
            .await
            .expect("Failed to create user");
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
