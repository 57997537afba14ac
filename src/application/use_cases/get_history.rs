use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::errors::AdvisoryError;
use crate::application::ports::SessionStore;
use crate::domain::entities::ConversationTurn;

#[derive(Debug, Clone)]
pub struct SessionHistory {
    pub session_id: Uuid,
    pub region: Option<String>,
    pub started_at: DateTime<Utc>,
    pub turns: Vec<ConversationTurn>,
}

pub struct GetHistoryUseCase {
    sessions: Arc<dyn SessionStore>,
}

impl GetHistoryUseCase {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self, session_id: Uuid) -> Result<SessionHistory, AdvisoryError> {
        let session = self
            .sessions
            .get(session_id)
            .await
            .ok_or(AdvisoryError::SessionNotFound(session_id))?;
        let state = session.lock().await;

        Ok(SessionHistory {
            session_id,
            region: state.region().map(str::to_string),
            started_at: state.created_at(),
            turns: state.memory().turns().to_vec(),
        })
    }
}
