//! Document store collaborators.
//!
//! The site talks to its persistence through two traits: [`CredentialStore`]
//! for user records and [`QuestionBank`] for quiz content. Two backends exist:
//!
//! - [`MemoryStore`]: `RwLock<HashMap>` state for tests and development
//! - [`FileStore`]: JSON documents under a data directory, rewritten on mutation

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{QuizQuestion, User};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Persisted user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look a user up by exact username.
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Insert a new record. Returns `false` without writing if the username is taken.
    async fn insert_user(&self, user: User) -> StoreResult<bool>;

    /// Delete by id. Returns whether a record was removed.
    async fn delete_user(&self, id: &str) -> StoreResult<bool>;

    /// All users, oldest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

/// Read-only quiz question bank.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Uniform random sample of up to `n` distinct questions.
    async fn sample_questions(&self, n: usize) -> StoreResult<Vec<QuizQuestion>>;

    /// The questions whose ids appear in `ids`; unknown ids are skipped.
    async fn find_questions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<QuizQuestion>>;
}

/// Draw `n` questions uniformly without replacement.
pub(crate) fn sample_uniform(questions: &[QuizQuestion], n: usize) -> Vec<QuizQuestion> {
    use rand::seq::SliceRandom;

    let mut rng = rand::thread_rng();
    questions.choose_multiple(&mut rng, n).cloned().collect()
}

/// Questions matching `ids`, each at most once, in bank order.
pub(crate) fn select_by_ids(questions: &[QuizQuestion], ids: &[String]) -> Vec<QuizQuestion> {
    questions.iter().filter(|q| ids.iter().any(|id| *id == q.id)).cloned().collect()
}
