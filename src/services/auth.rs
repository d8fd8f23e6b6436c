//! Authentication service
//!
//! Session lifecycle built on opaque bearer tokens: the cookie carries a
//! random token, the database stores only its SHA-256 digest as the
//! session id. Validation slides the expiry forward when a session is
//! close to expiring, and eagerly deletes sessions found expired.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::db::repositories::{SessionConflict, SessionRepository, UserRepository};
use crate::models::{Session, User};
use crate::services::password::verify_password;
use crate::services::token::{generate_session_token, session_id_from_token};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result of validating a request's session token. Either both the user
/// and session are present, or neither is.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, session: Session) -> Self {
        Self {
            user: Some(user),
            session: Some(session),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    config: SessionConfig,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        config: SessionConfig,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Validate a bearer token and resolve it to a user and session.
    ///
    /// Unknown tokens resolve to an anonymous result. Expired sessions
    /// are deleted before resolving to anonymous. Sessions within the
    /// renewal window get their expiry pushed out to a full lifetime
    /// from now, and the returned session reflects the new expiry.
    pub async fn validate_session_token(&self, token: &str) -> Result<AuthSession> {
        let session_id = session_id_from_token(token);

        let Some((mut session, user)) = self.session_repo.get_with_user(&session_id).await? else {
            return Ok(AuthSession::anonymous());
        };

        if session.is_expired() {
            self.session_repo.delete(&session.id).await?;
            return Ok(AuthSession::anonymous());
        }

        let now = Utc::now();
        if session.remaining(now) <= self.config.renewal_window() {
            let new_expiry = now + self.config.lifetime();
            self.session_repo.extend(&session.id, new_expiry).await?;
            session.expires_at = new_expiry;
        }

        Ok(AuthSession::authenticated(user, session))
    }

    /// Authenticate a user and create a session for them.
    ///
    /// Returns the bearer token (for the cookie) together with the
    /// stored session. Retries once with a fresh token if the derived
    /// session id collides with an existing one.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, Session), AuthError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        match self.create_session(user.id).await {
            Ok(pair) => Ok(pair),
            Err(e) if e.downcast_ref::<SessionConflict>().is_some() => {
                tracing::warn!("Session id collision, retrying with a fresh token");
                Ok(self.create_session(user.id).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_session(&self, user_id: i64) -> Result<(String, Session)> {
        let token = generate_session_token()?;
        let session = Session {
            id: session_id_from_token(&token),
            user_id,
            expires_at: Utc::now() + self.config.lifetime(),
            created_at: Utc::now(),
        };
        self.session_repo.create(&session).await?;
        Ok((token, session))
    }

    /// Invalidate a single session.
    pub async fn logout(&self, session_id: &str) -> Result<()> {
        self.session_repo.delete(session_id).await
    }

    /// Invalidate every session belonging to a user.
    pub async fn logout_everywhere(&self, user_id: i64) -> Result<()> {
        self.session_repo.delete_by_user(user_id).await
    }

    /// Delete all expired sessions. Returns the number removed.
    pub async fn cleanup_expired_sessions(&self) -> Result<i64> {
        self.session_repo.delete_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::db::create_test_pool;
    use crate::db::migrations::run_migrations;
    use crate::db::repositories::{
        SqlxSessionRepository, SqlxUserRepository,
    };
    use crate::models::User;
    use crate::services::password::hash_password;

    /// Delegating wrapper that counts expiry writes.
    struct CountingSessionRepository {
        inner: Arc<dyn SessionRepository>,
        extend_calls: AtomicUsize,
    }

    impl CountingSessionRepository {
        fn wrap(inner: Arc<dyn SessionRepository>) -> Arc<Self> {
            Arc::new(Self {
                inner,
                extend_calls: AtomicUsize::new(0),
            })
        }

        fn extend_count(&self) -> usize {
            self.extend_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionRepository for CountingSessionRepository {
        async fn create(&self, session: &Session) -> Result<Session> {
            self.inner.create(session).await
        }

        async fn get_with_user(&self, id: &str) -> Result<Option<(Session, User)>> {
            self.inner.get_with_user(id).await
        }

        async fn extend(&self, id: &str, expires_at: chrono::DateTime<Utc>) -> Result<()> {
            self.extend_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.extend(id, expires_at).await
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.inner.delete(id).await
        }

        async fn delete_by_user(&self, user_id: i64) -> Result<()> {
            self.inner.delete_by_user(user_id).await
        }

        async fn delete_expired(&self) -> Result<i64> {
            self.inner.delete_expired().await
        }
    }

    async fn setup() -> (AuthService, Arc<dyn SessionRepository>, Arc<dyn UserRepository>) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool);
        let service = AuthService::new(
            user_repo.clone(),
            session_repo.clone(),
            SessionConfig::default(),
        );
        (service, session_repo, user_repo)
    }

    async fn create_user(repo: &Arc<dyn UserRepository>, username: &str, password: &str) -> User {
        let hash = hash_password(password).expect("Failed to hash password");
        repo.create(&User::new(username.to_string(), hash, true))
            .await
            .expect("Failed to create user")
    }

    #[tokio::test]
    async fn test_login_returns_token_and_session() {
        let (service, _, user_repo) = setup().await;
        let user = create_user(&user_repo, "alice", "secret123").await;

        let (token, session) = service
            .login("alice", "secret123")
            .await
            .expect("Login failed");

        assert_eq!(token.len(), 29);
        assert_eq!(session.id, session_id_from_token(&token));
        assert_eq!(session.user_id, user.id);
        assert!(!token.contains(&session.id));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _, user_repo) = setup().await;
        create_user(&user_repo, "alice", "secret123").await;

        let result = service.login("alice", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (service, _, _) = setup().await;

        let result = service.login("nobody", "whatever").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_validate_fresh_session_no_renewal() {
        let (_, session_repo, user_repo) = setup().await;
        let counting = CountingSessionRepository::wrap(session_repo);
        let service = AuthService::new(
            user_repo.clone(),
            counting.clone(),
            SessionConfig::default(),
        );
        create_user(&user_repo, "alice", "secret123").await;

        let (token, session) = service
            .login("alice", "secret123")
            .await
            .expect("Login failed");

        let auth = service
            .validate_session_token(&token)
            .await
            .expect("Validation failed");

        assert!(auth.is_authenticated());
        // A fresh session is well outside the renewal window, so the
        // stored expiry must be untouched and no write issued.
        assert_eq!(counting.extend_count(), 0);
        let (stored, _) = counting
            .get_with_user(&session.id)
            .await
            .expect("Lookup failed")
            .expect("Session missing");
        assert_eq!(stored.expires_at.timestamp(), session.expires_at.timestamp());
    }

    #[tokio::test]
    async fn test_validate_inside_renewal_window_extends() {
        let (_, session_repo, user_repo) = setup().await;
        let counting = CountingSessionRepository::wrap(session_repo);
        let service = AuthService::new(
            user_repo.clone(),
            counting.clone(),
            SessionConfig::default(),
        );
        let user = create_user(&user_repo, "alice", "secret123").await;

        let token = generate_session_token().expect("Failed to generate token");
        let session = Session {
            id: session_id_from_token(&token),
            user_id: user.id,
            expires_at: Utc::now() + Duration::days(10),
            created_at: Utc::now(),
        };
        counting.create(&session).await.expect("Create failed");

        let before = Utc::now();
        let auth = service
            .validate_session_token(&token)
            .await
            .expect("Validation failed");

        let renewed = auth.session.expect("Session should be present");
        assert!(renewed.expires_at >= before + Duration::days(30));
        // Renewal is exactly one expiry write.
        assert_eq!(counting.extend_count(), 1);

        let (stored, _) = counting
            .get_with_user(&session.id)
            .await
            .expect("Lookup failed")
            .expect("Session missing");
        assert_eq!(stored.expires_at.timestamp(), renewed.expires_at.timestamp());
    }

    #[tokio::test]
    async fn test_validate_expired_session_deleted() {
        let (service, session_repo, user_repo) = setup().await;
        let user = create_user(&user_repo, "alice", "secret123").await;

        let token = generate_session_token().expect("Failed to generate token");
        let session = Session {
            id: session_id_from_token(&token),
            user_id: user.id,
            expires_at: Utc::now() - Duration::hours(1),
            created_at: Utc::now() - Duration::days(31),
        };
        session_repo.create(&session).await.expect("Create failed");

        let auth = service
            .validate_session_token(&token)
            .await
            .expect("Validation failed");

        assert!(!auth.is_authenticated());
        assert!(auth.session.is_none());

        let stored = session_repo
            .get_with_user(&session.id)
            .await
            .expect("Lookup failed");
        assert!(stored.is_none(), "Expired session should be deleted");
    }

    #[tokio::test]
    async fn test_validate_unknown_token_is_anonymous() {
        let (service, _, _) = setup().await;

        let token = generate_session_token().expect("Failed to generate token");
        let auth = service
            .validate_session_token(&token)
            .await
            .expect("Validation failed");

        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_validate_garbage_token_is_anonymous() {
        let (service, _, _) = setup().await;

        let auth = service
            .validate_session_token("not-a-real-token")
            .await
            .expect("Validation failed");

        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_targets_single_session() {
        let (service, _, user_repo) = setup().await;
        create_user(&user_repo, "alice", "secret123").await;

        let (token1, session1) = service.login("alice", "secret123").await.expect("Login failed");
        let (token2, _) = service.login("alice", "secret123").await.expect("Login failed");

        service.logout(&session1.id).await.expect("Logout failed");

        let auth1 = service.validate_session_token(&token1).await.expect("Validation failed");
        let auth2 = service.validate_session_token(&token2).await.expect("Validation failed");

        assert!(!auth1.is_authenticated());
        assert!(auth2.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_everywhere() {
        let (service, _, user_repo) = setup().await;
        let user = create_user(&user_repo, "alice", "secret123").await;

        let (token1, _) = service.login("alice", "secret123").await.expect("Login failed");
        let (token2, _) = service.login("alice", "secret123").await.expect("Login failed");

        service.logout_everywhere(user.id).await.expect("Logout failed");

        assert!(!service
            .validate_session_token(&token1)
            .await
            .expect("Validation failed")
            .is_authenticated());
        assert!(!service
            .validate_session_token(&token2)
            .await
            .expect("Validation failed")
            .is_authenticated());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let (service, session_repo, user_repo) = setup().await;
        let user = create_user(&user_repo, "alice", "secret123").await;

        let (live_token, _) = service.login("alice", "secret123").await.expect("Login failed");

        for _ in 0..3 {
            let token = generate_session_token().expect("Failed to generate token");
            session_repo
                .create(&Session {
                    id: session_id_from_token(&token),
                    user_id: user.id,
                    expires_at: Utc::now() - Duration::days(1),
                    created_at: Utc::now() - Duration::days(31),
                })
                .await
                .expect("Create failed");
        }

        let removed = service
            .cleanup_expired_sessions()
            .await
            .expect("Cleanup failed");
        assert_eq!(removed, 3);

        assert!(service
            .validate_session_token(&live_token)
            .await
            .expect("Validation failed")
            .is_authenticated());
    }
}
