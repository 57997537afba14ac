use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::services::RagChain;
use crate::domain::entities::ConversationLog;

/// Per-session state: the conversation log and the chain built for the
/// selected region, which carries that region's weather.
pub struct SessionState {
    id: Uuid,
    memory: ConversationLog,
    chain: Option<Arc<RagChain>>,
    region: Option<String>,
    created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            memory: ConversationLog::new(),
            chain: None,
            region: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn memory(&self) -> &ConversationLog {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ConversationLog {
        &mut self.memory
    }

    pub fn chain(&self) -> Option<Arc<RagChain>> {
        self.chain.clone()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces any previous region and chain together.
    pub fn select_region(&mut self, chain: Arc<RagChain>) {
        self.region = Some(chain.region().to_string());
        self.chain = Some(chain);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
