use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::application::ports::{SessionHandle, SessionStore};
use crate::application::session_state::SessionState;

pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

struct StoredSession {
    handle: SessionHandle,
    last_access: Instant,
}

impl StoredSession {
    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_access) >= ttl
    }
}

/// Process-local sessions; nothing survives a restart.
///
/// A session untouched for `idle_ttl` is dropped, and creating a session
/// while `max_sessions` are live drops the least recently used one.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TTL)
    }

    pub fn with_limits(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    fn evict(&self, sessions: &mut HashMap<Uuid, StoredSession>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, self.idle_ttl));

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_access)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => sessions.remove(&id),
                None => break,
            };
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} sessions, {} remain", evicted, sessions.len());
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self) -> (Uuid, SessionHandle) {
        let state = SessionState::new();
        let id = state.id();
        let handle = Arc::new(Mutex::new(state));

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, now);
        sessions.insert(
            id,
            StoredSession {
                handle: handle.clone(),
                last_access: now,
            },
        );
        (id, handle)
    }

    async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if sessions.get(&id)?.is_idle(now, self.idle_ttl) {
            sessions.remove(&id);
            tracing::debug!("Session {} expired after {:?} idle", id, self.idle_ttl);
            return None;
        }

        let session = sessions.get_mut(&id)?;
        session.last_access = now;
        Some(session.handle.clone())
    }

    async fn count(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| !session.is_idle(now, self.idle_ttl))
            .count()
    }
}
