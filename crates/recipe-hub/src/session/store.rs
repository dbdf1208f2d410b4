//! Session storage backends.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::SessionData;
use crate::config::site;

/// Where session state is kept between requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load state for an id; `None` for unknown or expired sessions.
    async fn load(&self, id: &str) -> Option<SessionData>;

    /// Create or overwrite state for an id.
    async fn save(&self, id: &str, data: SessionData);

    /// Forget an id. Unknown ids are ignored.
    async fn remove(&self, id: &str);

    /// Live session count (for monitoring).
    async fn count(&self) -> u64;
}

/// In-process session store with idle expiry.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Cache<String, SessionData>,
}

impl MemorySessionStore {
    /// Create a store whose sessions expire after `ttl` without activity.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(site::SESSION_MAX_CAPACITY)
            .time_to_idle(ttl)
            .build();
        Self { sessions }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(site::SESSION_TTL)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Option<SessionData> {
        self.sessions.get(id).await
    }

    async fn save(&self, id: &str, data: SessionData) {
        self.sessions.insert(id.to_owned(), data).await;
    }

    async fn remove(&self, id: &str) {
        self.sessions.invalidate(id).await;
    }

    async fn count(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore").finish()
    }
}
