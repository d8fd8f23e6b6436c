//! Session repository
//!
//! Database operations for session records. Sessions are keyed by the
//! verifier derived from the bearer token, so the joined lookup in
//! `get_with_user` is the hot path for every authenticated request.

use crate::db::DbPool;
use crate::models::{Session, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

/// A session insert collided with an existing verifier.
///
/// Astronomically unlikely given the token entropy, but a defined
/// failure rather than a silent overwrite. Callers retry with a fresh
/// token.
#[derive(Debug, thiserror::Error)]
#[error("session id already exists")]
pub struct SessionConflict;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session. Fails with [`SessionConflict`] (in the
    /// error chain) if the id is already taken.
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get a session together with its owning user in a single lookup
    async fn get_with_user(&self, id: &str) -> Result<Option<(Session, User)>>;

    /// Update a session's expiry in place
    async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Delete a session. Deleting a non-existent id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for a user
    async fn delete_by_user(&self, user_id: i64) -> Result<()>;

    /// Delete expired sessions, returning how many were removed
    async fn delete_expired(&self) -> Result<i64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DbPool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(session.clone()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(anyhow::Error::new(SessionConflict))
            }
            Err(e) => Err(e).context("Failed to create session"),
        }
    }

    async fn get_with_user(&self, id: &str) -> Result<Option<(Session, User)>> {
        let row = sqlx::query(
            r#"
            SELECT
                s.id, s.user_id, s.expires_at, s.created_at,
                u.username, u.password_hash, u.is_admin,
                u.created_at AS user_created_at
            FROM sessions s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session with user")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let session = Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
        };
        let user = User {
            id: session.user_id,
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            is_admin: row.get("is_admin"),
            created_at: row.get("user_created_at"),
        };

        Ok(Some((session, user)))
    }

    async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE id = ?")
            .bind(expires_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to extend session")?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete sessions by user")?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<i64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup_test_repo() -> (DbPool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo)
    }

    async fn create_test_user(pool: &DbPool, username: &str) -> User {
        let repo = SqlxUserRepository::new(pool.clone());
        repo.create(&User::new(username.to_string(), "hash".to_string(), true))
            .await
            .expect("Failed to create test user")
    }

    fn test_session(id: &str, user_id: i64, expires_in_days: i64) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            user_id,
            expires_at: now + Duration::days(expires_in_days),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_with_user() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;

        let session = test_session("verifier-1", user.id, 30);
        repo.create(&session).await.expect("Failed to create session");

        let (found, found_user) = repo
            .get_with_user("verifier-1")
            .await
            .expect("Failed to get session")
            .expect("Session not found");

        assert_eq!(found.id, session.id);
        assert_eq!(found.user_id, user.id);
        assert_eq!(found_user.username, "alice");
        assert!(found_user.is_admin);
    }

    #[tokio::test]
    async fn test_get_with_user_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo
            .get_with_user("nonexistent-verifier")
            .await
            .expect("Lookup should not error");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;

        let session = test_session("verifier-dup", user.id, 30);
        repo.create(&session).await.expect("First create should work");

        let err = repo
            .create(&session)
            .await
            .expect_err("Duplicate verifier must be rejected");
        assert!(
            err.downcast_ref::<SessionConflict>().is_some(),
            "expected SessionConflict in chain, got: {err:#}"
        );
    }

    #[tokio::test]
    async fn test_extend_updates_expiry() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;

        let session = test_session("verifier-2", user.id, 10);
        repo.create(&session).await.expect("Failed to create session");

        let new_expiry = Utc::now() + Duration::days(30);
        repo.extend("verifier-2", new_expiry)
            .await
            .expect("Failed to extend session");

        let (found, _) = repo
            .get_with_user("verifier-2")
            .await
            .expect("Failed to get session")
            .expect("Session not found");
        assert!((found.expires_at - new_expiry).num_seconds().abs() < 2);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;

        let session = test_session("verifier-3", user.id, 30);
        repo.create(&session).await.expect("Failed to create session");

        repo.delete("verifier-3").await.expect("Failed to delete");
        repo.delete("verifier-3")
            .await
            .expect("Deleting a missing session is not an error");

        assert!(repo.get_with_user("verifier-3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_user_spares_other_users() {
        let (pool, repo) = setup_test_repo().await;
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;

        repo.create(&test_session("a1", alice.id, 30)).await.unwrap();
        repo.create(&test_session("a2", alice.id, 30)).await.unwrap();
        repo.create(&test_session("b1", bob.id, 30)).await.unwrap();

        repo.delete_by_user(alice.id)
            .await
            .expect("Failed to delete sessions by user");

        assert!(repo.get_with_user("a1").await.unwrap().is_none());
        assert!(repo.get_with_user("a2").await.unwrap().is_none());
        assert!(repo.get_with_user("b1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;

        let now = Utc::now();
        let expired = Session {
            id: "expired".to_string(),
            user_id: user.id,
            expires_at: now - Duration::days(1),
            created_at: now - Duration::days(31),
        };
        repo.create(&expired).await.unwrap();
        repo.create(&test_session("live", user.id, 30)).await.unwrap();

        let deleted = repo.delete_expired().await.expect("GC failed");
        assert_eq!(deleted, 1);
        assert!(repo.get_with_user("expired").await.unwrap().is_none());
        assert!(repo.get_with_user("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_user_delete_cascades_to_sessions() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;
        repo.create(&test_session("s1", user.id, 30)).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user.id)
            .execute(&pool)
            .await
            .expect("Failed to delete user");

        assert!(repo.get_with_user("s1").await.unwrap().is_none());
    }
}
