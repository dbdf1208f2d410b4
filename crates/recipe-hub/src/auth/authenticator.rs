//! Registration, login and admin user management.

use std::sync::Arc;

use super::hasher::PasswordHasher;
use crate::error::{AuthError, AuthResult};
use crate::models::User;
use crate::session::SessionHandle;
use crate::store::CredentialStore;

/// Verifies credentials against the credential store.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    admin_username: String,
    /// Verified against on unknown usernames so both failure paths cost one hash.
    dummy_hash: Arc<str>,
}

impl Authenticator {
    /// Create an authenticator. `admin_username` is granted the admin flag on self-registration.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        admin_username: impl Into<String>,
    ) -> AuthResult<Self> {
        let dummy_hash = hasher.hash_password(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            store,
            hasher,
            admin_username: admin_username.into(),
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Register a new self-service user.
    ///
    /// The reserved administrator username is the only path to `is_admin` here.
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<User> {
        let username = username.trim();
        let is_admin = username == self.admin_username;
        let user = self.create_user(username, password, is_admin).await?;
        tracing::info!(username = %user.username, is_admin = user.is_admin, "Registered user");
        Ok(user)
    }

    /// Admin action: create a user with an explicit admin flag.
    pub async fn add_user(&self, username: &str, password: &str, is_admin: bool) -> AuthResult<User> {
        let user = self.create_user(username.trim(), password, is_admin).await?;
        tracing::info!(username = %user.username, is_admin = user.is_admin, "Admin added user");
        Ok(user)
    }

    /// Check credentials. Unknown user and wrong password fail identically.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<User> {
        let found = self.store.find_user_by_username(username).await?;

        let hash = found
            .as_ref()
            .map_or_else(|| self.dummy_hash.to_string(), |u| u.password_hash.clone());
        let verified = self.verify(hash, password).await?;

        match found {
            Some(user) if verified => {
                tracing::info!(username = %user.username, "User logged in");
                Ok(user)
            }
            _ => {
                tracing::debug!(username = %username, "Rejected login");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Destroy the session. Safe to call on an already-empty session.
    pub async fn logout(&self, session: &SessionHandle) {
        if let Some(user) = session.user().await {
            tracing::info!(username = %user.username, "User logged out");
        }
        session.destroy().await;
    }

    /// Admin action: delete a user by id.
    pub async fn delete_user(&self, id: &str) -> AuthResult<bool> {
        let removed = self.store.delete_user(id).await?;
        if removed {
            tracing::info!(user_id = %id, "Admin deleted user");
        }
        Ok(removed)
    }

    /// Admin action: all users.
    pub async fn list_users(&self) -> AuthResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Expects an already-trimmed `username`.
    async fn create_user(&self, username: &str, password: &str, is_admin: bool) -> AuthResult<User> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::invalid_input("username and password are required"));
        }

        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(AuthError::DuplicateUsername);
        }

        let hash = self.hash(password.to_owned()).await?;
        let user = User::new(username, hash, is_admin);

        // A concurrent registration may have won the name since the lookup.
        if !self.store.insert_user(user.clone()).await? {
            return Err(AuthError::DuplicateUsername);
        }
        Ok(user)
    }

    async fn hash(&self, password: String) -> AuthResult<String> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    async fn verify(&self, hash: String, password: &str) -> AuthResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_password(&hash, &password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").field("admin_username", &self.admin_username).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::config::HasherCost;
    use crate::store::MemoryStore;

    fn authenticator() -> (Authenticator, MemoryStore) {
        let store = MemoryStore::new();
        let hasher = Argon2Hasher::new(HasherCost::TESTING).unwrap();
        let auth = Authenticator::new(Arc::new(store.clone()), Arc::new(hasher), "root").unwrap();
        (auth, store)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (auth, _) = authenticator();
        let user = auth.register("alice", "pw1").await.unwrap();
        assert!(!user.is_admin);

        let logged_in = auth.login("alice", "pw1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_trims_username() {
        let (auth, store) = authenticator();
        auth.register("  alice ", "pw").await.unwrap();
        assert!(store.find_user_by_username("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let (auth, store) = authenticator();
        assert!(matches!(auth.register("", "pw").await, Err(AuthError::InvalidInput(_))));
        assert!(matches!(auth.register("bob", "").await, Err(AuthError::InvalidInput(_))));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_password_not_stored_in_clear() {
        let (auth, store) = authenticator();
        auth.register("carol", "hunter2").await.unwrap();
        let stored = store.find_user_by_username("carol").await.unwrap().unwrap();
        assert!(!stored.password_hash.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_add_user_respects_flag() {
        let (auth, _) = authenticator();
        assert!(auth.add_user("ops", "pw", true).await.unwrap().is_admin);
        assert!(!auth.add_user("dev", "pw", false).await.unwrap().is_admin);
        assert!(matches!(auth.add_user("ops", "pw", false).await, Err(AuthError::DuplicateUsername)));
    }
}
