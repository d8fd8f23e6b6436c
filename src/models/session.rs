//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session entity for cookie-based authentication.
///
/// The `id` is not the bearer token itself but a one-way verifier
/// derived from it (see `services::token`), so a leaked database row
/// never yields a usable credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Verifier derived from the bearer token (primary key)
    pub id: String,
    /// Associated user ID
    pub user_id: i64,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Time remaining until expiry, measured from `now`.
    ///
    /// Negative for expired sessions.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}
