//! Server-side sessions keyed by a signed cookie.
//!
//! Session state lives in a pluggable [`SessionStore`]; the cookie only carries
//! an opaque UUID. Each request gets a [`SessionHandle`] in its extensions,
//! and [`layer::session_middleware`] writes the state back once the handler
//! returns (last write wins for concurrent requests on one session).

pub mod layer;
mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::site;
use crate::models::{SessionUser, User};
use crate::quiz::QuizAttempt;

pub use layer::{COOKIE_NAME, SessionLayer};
pub use store::{MemorySessionStore, SessionStore};

/// State held per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Logged-in identity, absent for anonymous visitors.
    #[serde(default)]
    pub user: Option<SessionUser>,

    /// Locale chosen via `?lang=`.
    pub lang: String,

    /// Quiz currently being answered.
    #[serde(default)]
    pub quiz: Option<QuizAttempt>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self { user: None, lang: site::DEFAULT_LANG.to_string(), quiz: None }
    }
}

#[derive(Debug)]
struct HandleState {
    data: SessionData,
    destroyed: bool,
    rotate: bool,
}

/// Per-request access to the session. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    id: Arc<str>,
    state: Arc<Mutex<HandleState>>,
}

impl SessionHandle {
    /// Wrap loaded state.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>, data: SessionData) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(HandleState { data, destroyed: false, rotate: false })),
        }
    }

    /// Copy of the current state.
    pub async fn data(&self) -> SessionData {
        self.state.lock().await.data.clone()
    }

    /// Logged-in user, if any.
    pub async fn user(&self) -> Option<SessionUser> {
        self.state.lock().await.data.user.clone()
    }

    /// Current locale.
    pub async fn lang(&self) -> String {
        self.state.lock().await.data.lang.clone()
    }

    /// Install an authenticated identity. The session id is rotated on write-back.
    pub async fn login(&self, user: &User) {
        let mut state = self.state.lock().await;
        state.data.user = Some(user.to_session_user());
        state.data.quiz = None;
        state.rotate = true;
    }

    /// Record the quiz just served.
    pub async fn set_quiz(&self, attempt: Option<QuizAttempt>) {
        self.state.lock().await.data.quiz = attempt;
    }

    /// Active quiz attempt, left in place until a submission is graded.
    pub async fn quiz(&self) -> Option<QuizAttempt> {
        self.state.lock().await.data.quiz.clone()
    }

    /// Drop all state; the store entry and cookie are removed on write-back.
    pub async fn destroy(&self) {
        let mut state = self.state.lock().await;
        state.data = SessionData::default();
        state.destroyed = true;
    }

    pub(crate) async fn finish(&self) -> (SessionData, bool, bool) {
        let state = self.state.lock().await;
        (state.data.clone(), state.destroyed, state.rotate)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_sets_user_and_rotation() {
        let handle = SessionHandle::new("s1", SessionData::default());
        let user = User::new("alice", "hash".into(), false);
        handle.login(&user).await;

        let current = handle.user().await.unwrap();
        assert_eq!(current.username, "alice");
        assert!(!current.is_admin);

        let (_, destroyed, rotate) = handle.finish().await;
        assert!(!destroyed);
        assert!(rotate);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let handle = SessionHandle::new("s1", SessionData::default());
        handle.destroy().await;
        handle.destroy().await;

        let (data, destroyed, _) = handle.finish().await;
        assert!(destroyed);
        assert_eq!(data, SessionData::default());
    }

    #[test]
    fn test_default_lang() {
        assert_eq!(SessionData::default().lang, "en");
    }
}
