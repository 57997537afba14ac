use std::sync::Arc;

use uuid::Uuid;

use crate::application::errors::AdvisoryError;
use crate::application::ports::SessionStore;
use crate::application::services::{RetrievalStats, Retriever};

pub const READY_MESSAGE: &str =
    "AgriRAG system is ready! Choose your region, then ask questions in Swahili or English.";

#[derive(Debug, Clone)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub message: String,
    pub stats: RetrievalStats,
}

pub struct StartSessionUseCase {
    retriever: Arc<Retriever>,
    sessions: Arc<dyn SessionStore>,
}

impl StartSessionUseCase {
    pub fn new(retriever: Arc<Retriever>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            retriever,
            sessions,
        }
    }

    /// Opens a session once the knowledge base is ready. The first caller
    /// pays for loading or building the index; later callers reuse it.
    pub async fn execute(&self) -> Result<StartSessionResponse, AdvisoryError> {
        let stats = self.retriever.retrieve().await?;
        let (session_id, _) = self.sessions.create().await;

        tracing::info!(
            "Started session {} ({} active)",
            session_id,
            self.sessions.count().await
        );

        Ok(StartSessionResponse {
            session_id,
            message: READY_MESSAGE.to_string(),
            stats,
        })
    }
}
