//! In-memory store for tests and development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, QuestionBank, sample_uniform, select_by_ids};
use crate::error::StoreResult;
use crate::models::{QuizQuestion, User};

/// In-memory users and questions.
#[derive(Clone, Default)]
pub struct MemoryStore {
    /// Users keyed by username (the uniqueness invariant lives in the key).
    users: Arc<RwLock<HashMap<String, User>>>,
    questions: Arc<RwLock<Vec<QuizQuestion>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a question bank.
    #[must_use]
    pub fn with_questions(questions: Vec<QuizQuestion>) -> Self {
        Self { users: Arc::default(), questions: Arc::new(RwLock::new(questions)) }
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert_user(&self, user: User) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Ok(false);
        }
        users.insert(user.username.clone(), user);
        Ok(true)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, u| u.id != id);
        Ok(users.len() < before)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

#[async_trait]
impl QuestionBank for MemoryStore {
    async fn sample_questions(&self, n: usize) -> StoreResult<Vec<QuizQuestion>> {
        Ok(sample_uniform(&self.questions.read().await, n))
    }

    async fn find_questions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<QuizQuestion>> {
        Ok(select_by_ids(&self.questions.read().await, ids))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}
