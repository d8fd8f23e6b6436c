//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing an account with access to the admin area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2 PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the user may perform admin mutations
    pub is_admin: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, password_hash: String, is_admin: bool) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            is_admin,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("alice".to_string(), "$argon2id$...".to_string(), true);
        assert_eq!(user.id, 0);
        assert_eq!(user.username, "alice");
        assert!(user.is_admin);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("alice".to_string(), "secret-hash".to_string(), false);
        let json = serde_json::to_string(&user).expect("serialize user");
        assert!(!json.contains("secret-hash"));
    }
}
