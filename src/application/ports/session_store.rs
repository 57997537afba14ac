use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::session_state::SessionState;

/// A session's state behind its own lock. Holders keep it only for short
/// reads and writes, never across a network call.
pub type SessionHandle = Arc<Mutex<SessionState>>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self) -> (Uuid, SessionHandle);

    async fn get(&self, id: Uuid) -> Option<SessionHandle>;

    async fn count(&self) -> usize;
}
