//! JSON document store on the local filesystem.
//!
//! Layout under the data directory:
//! - `users.json`: array of [`User`] documents, rewritten after every mutation
//! - `questions.json`: array of [`QuizQuestion`] documents, read once at startup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CredentialStore, MemoryStore, QuestionBank};
use crate::error::{StoreError, StoreResult};
use crate::models::{QuizQuestion, User};

const USERS_FILE: &str = "users.json";
const QUESTIONS_FILE: &str = "questions.json";

/// File-backed store. Reads are served from memory.
#[derive(Clone)]
pub struct FileStore {
    dir: PathBuf,
    inner: MemoryStore,
    /// Serializes snapshot writes so files never interleave.
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the store, loading both documents.
    ///
    /// A missing directory is an error so the server fails fast instead of
    /// running without its data. A missing `users.json` starts an empty user set.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        let meta = tokio::fs::metadata(&dir).await.map_err(|e| {
            StoreError::unavailable(format!("data directory {}: {e}", dir.display()))
        })?;
        if !meta.is_dir() {
            return Err(StoreError::unavailable(format!("{} is not a directory", dir.display())));
        }

        let questions: Vec<QuizQuestion> = read_documents(&dir.join(QUESTIONS_FILE)).await?;
        let users: Vec<User> = read_documents(&dir.join(USERS_FILE)).await?;

        if questions.is_empty() {
            tracing::warn!(dir = %dir.display(), "Question bank is empty");
        }

        let inner = MemoryStore::with_questions(questions);
        for user in users {
            let username = user.username.clone();
            if !inner.insert_user(user).await? {
                tracing::warn!(username = %username, "Skipping duplicate user document");
            }
        }

        tracing::info!(
            dir = %dir.display(),
            users = inner.user_count().await,
            "Opened file store"
        );

        Ok(Self { dir, inner, write_lock: Arc::new(Mutex::new(())) })
    }

    async fn persist_users(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let users = self.inner.list_users().await?;
        let body = serde_json::to_vec_pretty(&users)?;

        let target = self.dir.join(USERS_FILE);
        let tmp = self.dir.join(format!("{USERS_FILE}.tmp"));
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }
}

async fn read_documents<T>(path: &Path) -> StoreResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn insert_user(&self, user: User) -> StoreResult<bool> {
        if !self.inner.insert_user(user).await? {
            return Ok(false);
        }
        self.persist_users().await?;
        Ok(true)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        if !self.inner.delete_user(id).await? {
            return Ok(false);
        }
        self.persist_users().await?;
        Ok(true)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.inner.list_users().await
    }
}

#[async_trait]
impl QuestionBank for FileStore {
    async fn sample_questions(&self, n: usize) -> StoreResult<Vec<QuizQuestion>> {
        self.inner.sample_questions(n).await
    }

    async fn find_questions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<QuizQuestion>> {
        self.inner.find_questions_by_ids(ids).await
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore").field("dir", &self.dir).finish()
    }
}
