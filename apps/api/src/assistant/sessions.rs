//! In-memory chat session store.
//!
//! Sessions idle for longer than `idle_ttl` are dropped, and the store never
//! holds more than `max_sessions`: when full, opening a session evicts the
//! least recently active one. Nothing survives a restart.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::assistant::chat::ChatSession;

pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_IDLE_TTL_SECS: u64 = 3600;

pub struct ChatStore {
    sessions: RwLock<HashMap<Uuid, ChatSession>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TTL_SECS)
    }
}

impl ChatStore {
    pub fn new(max_sessions: usize, idle_ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_ttl: Duration::seconds(
                i64::try_from(idle_ttl_secs)
                    .unwrap_or(i64::MAX)
                    .min(i64::MAX / 1000),
            ),
        }
    }

    /// Opens a new session, evicting idle sessions and, if still full, the stalest one.
    pub async fn create(&self) -> ChatSession {
        let session = ChatSession::new();
        let mut sessions = self.sessions.write().await;

        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_idle(s, now));

        while sessions.len() >= self.max_sessions {
            let Some(stalest) = sessions
                .values()
                .min_by_key(|s| s.last_activity)
                .map(|s| s.id)
            else {
                break;
            };
            sessions.remove(&stalest);
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted chat sessions");
        }

        sessions.insert(session.id, session.clone());
        session
    }

    /// A snapshot of the session, unless it is unknown or has gone idle.
    pub async fn get(&self, id: Uuid) -> Option<ChatSession> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| !self.is_idle(s, now))
            .cloned()
    }

    /// Runs `f` on a live session under the write lock. `None` when the session is gone.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut ChatSession) -> R) -> Option<R> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id).is_some_and(|s| self.is_idle(s, now)) {
            sessions.remove(&id);
        }
        sessions.get_mut(&id).map(f)
    }

    /// Closes a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_idle(&self, session: &ChatSession, now: DateTime<Utc>) -> bool {
        // A pending reply keeps the session alive until the backend answers.
        !session.is_typing && now - session.last_activity > self.idle_ttl
    }
}
