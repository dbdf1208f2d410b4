//! Authenticator behavior over the in-memory store.

use std::sync::Arc;

use recipe_hub::auth::{Argon2Hasher, Authenticator, PasswordHasher};
use recipe_hub::config::HasherCost;
use recipe_hub::error::AuthError;
use recipe_hub::session::{SessionData, SessionHandle};
use recipe_hub::store::{CredentialStore, MemoryStore};

const ADMIN: &str = "Rustemdastan";

fn setup() -> (Authenticator, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(Argon2Hasher::new(HasherCost::TESTING).unwrap());
    let auth = Authenticator::new(store.clone(), hasher, ADMIN).unwrap();
    (auth, store)
}

#[tokio::test]
async fn test_register_then_login_as_regular_user() {
    let (auth, _) = setup();
    auth.register("alice", "pw1").await.unwrap();

    let user = auth.login("alice", "pw1").await.unwrap();
    assert_eq!(user.username, "alice");
    assert!(!user.is_admin);
}

#[tokio::test]
async fn test_duplicate_registration_rejected_and_first_kept() {
    let (auth, store) = setup();
    auth.register("alice", "pw1").await.unwrap();

    let err = auth.register("alice", "other").await.unwrap_err();
    assert!(matches!(err, AuthError::DuplicateUsername));
    assert_eq!(store.user_count().await, 1);

    // The first password still works, the second never took effect.
    assert!(auth.login("alice", "pw1").await.is_ok());
    assert!(auth.login("alice", "other").await.is_err());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (auth, _) = setup();
    auth.register("alice", "pw1").await.unwrap();

    let wrong_password = auth.login("alice", "nope").await.unwrap_err();
    let unknown_user = auth.login("mallory", "pw1").await.unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    assert_eq!(wrong_password.user_message(), Some("Invalid username or password!"));
}

#[tokio::test]
async fn test_reserved_username_registers_as_admin() {
    let (auth, _) = setup();
    let admin = auth.register(ADMIN, "root-pw").await.unwrap();
    assert!(admin.is_admin);

    let regular = auth.register("bob", "pw").await.unwrap();
    assert!(!regular.is_admin);
}

#[tokio::test]
async fn test_padded_reserved_username_still_registers_as_admin() {
    let (auth, store) = setup();
    let admin = auth.register(&format!("  {ADMIN} "), "root-pw").await.unwrap();
    assert!(admin.is_admin);
    assert_eq!(admin.username, ADMIN);

    let stored = store.find_user_by_username(ADMIN).await.unwrap().unwrap();
    assert!(stored.is_admin);
    assert!(matches!(auth.register(ADMIN, "other").await, Err(AuthError::DuplicateUsername)));
}

#[tokio::test]
async fn test_stored_hash_is_not_the_password() {
    let (auth, store) = setup();
    auth.register("alice", "pw1").await.unwrap();

    let stored = store.find_user_by_username("alice").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "pw1");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_admin_add_and_delete_user() {
    let (auth, store) = setup();
    let added = auth.add_user("chef", "pw", true).await.unwrap();
    assert!(added.is_admin);

    let users = auth.list_users().await.unwrap();
    assert_eq!(users.len(), 1);

    assert!(auth.delete_user(&added.id).await.unwrap());
    assert!(!auth.delete_user(&added.id).await.unwrap());
    assert_eq!(store.user_count().await, 0);
    assert!(matches!(auth.login("chef", "pw").await, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_blank_credentials_rejected() {
    let (auth, store) = setup();
    assert!(matches!(auth.register("   ", "pw").await, Err(AuthError::InvalidInput(_))));
    assert!(matches!(auth.register("alice", "").await, Err(AuthError::InvalidInput(_))));
    assert_eq!(store.user_count().await, 0);
}

#[tokio::test]
async fn test_logout_clears_session_and_is_idempotent() {
    let (auth, _) = setup();
    let user = auth.register("alice", "pw1").await.unwrap();

    let session = SessionHandle::new("s1", SessionData::default());
    session.login(&user).await;
    assert!(session.user().await.is_some());

    auth.logout(&session).await;
    assert!(session.user().await.is_none());
    auth.logout(&session).await;
    assert!(session.user().await.is_none());
}

#[tokio::test]
async fn test_concurrent_registration_yields_one_account() {
    let (auth, store) = setup();
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..4 {
        let auth = auth.clone();
        tasks.spawn(async move { auth.register("racer", &format!("pw{i}")).await });
    }

    let mut created = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, AuthError::DuplicateUsername)),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(store.user_count().await, 1);
}

#[test]
fn test_hasher_round_trip() {
    let hasher = Argon2Hasher::new(HasherCost::TESTING).unwrap();
    let hash = hasher.hash_password("secret").unwrap();
    assert!(hasher.verify_password(&hash, "secret"));
    assert!(!hasher.verify_password(&hash, "Secret"));
}
