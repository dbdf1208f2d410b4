//! User records as kept in the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered site user.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque user id (UUID v4).
    pub id: String,

    /// Unique login name.
    pub username: String,

    /// PHC-formatted Argon2 hash.
    pub password_hash: String,

    /// Grants access to the admin panel.
    #[serde(default)]
    pub is_admin: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record with a new id.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: String, is_admin: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash,
            is_admin,
            created_at: Utc::now(),
        }
    }

    /// The identity stored in a session.
    #[must_use]
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser { id: self.id.clone(), username: self.username.clone(), is_admin: self.is_admin }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("is_admin", &self.is_admin)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Identity carried in session state. Never holds the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
}
