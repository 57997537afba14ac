use std::sync::Arc;

use uuid::Uuid;

use crate::application::errors::AdvisoryError;
use crate::application::ports::SessionStore;
use crate::application::services::TranslationPipeline;
use crate::domain::value_objects::Language;

#[derive(Debug, Clone)]
pub struct AnswerQuestionRequest {
    pub session_id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerQuestionResponse {
    pub reply: String,
    pub detected_language: Language,
    /// The pivot-language query, present only when the input was translated.
    pub translated_query: Option<String>,
}

pub struct AnswerQuestionUseCase {
    translation: Arc<TranslationPipeline>,
    sessions: Arc<dyn SessionStore>,
}

impl AnswerQuestionUseCase {
    pub fn new(translation: Arc<TranslationPipeline>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            translation,
            sessions,
        }
    }

    /// Runs one turn: inbound translation, chain invocation, outbound
    /// translation. The turn is logged only if every stage succeeds.
    ///
    /// The session lock is held only to read the chain and to append the
    /// finished turn, never across the translation or model calls.
    pub async fn execute(
        &self,
        request: AnswerQuestionRequest,
    ) -> Result<AnswerQuestionResponse, AdvisoryError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(AdvisoryError::InvalidInput(
                "message text cannot be empty".to_string(),
            ));
        }

        let session = self
            .sessions
            .get(request.session_id)
            .await
            .ok_or(AdvisoryError::SessionNotFound(request.session_id))?;
        let chain = session
            .lock()
            .await
            .chain()
            .ok_or(AdvisoryError::RegionNotSelected)?;

        let pivot = self.translation.to_pivot(text).await?;
        if pivot.translated {
            tracing::info!("Translated query: {}", pivot.text);
        }

        let answer = chain.answer(&pivot.text).await?;
        let reply = self
            .translation
            .from_pivot(&answer, pivot.source_language)
            .await?;

        let mut state = session.lock().await;
        state.memory_mut().push_user(text);
        state.memory_mut().push_assistant(reply.clone());

        Ok(AnswerQuestionResponse {
            reply,
            detected_language: pivot.source_language,
            translated_query: pivot.translated.then_some(pivot.text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::RagChain;
    use crate::domain::entities::{Role, WeatherSummary};
    use crate::infrastructure::session::InMemorySessionStore;
    use crate::test_support::{EchoModel, FailingModel, RecordingTranslator, initialized_retriever};
    use crate::application::ports::language_model::LanguageModelError;
    use crate::application::ports::{LanguageModel, SessionHandle};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixture {
        use_case: AnswerQuestionUseCase,
        sessions: Arc<InMemorySessionStore>,
        session_id: Uuid,
        inbound: Arc<RecordingTranslator>,
        outbound: Arc<RecordingTranslator>,
    }

    async fn fixture(llm: Option<Arc<dyn LanguageModel>>) -> Fixture {
        let inbound = Arc::new(RecordingTranslator::new("inbound"));
        let outbound = Arc::new(RecordingTranslator::new("outbound"));
        let translation = Arc::new(TranslationPipeline::new(inbound.clone(), outbound.clone()));
        let sessions = Arc::new(InMemorySessionStore::new());
        let (session_id, handle) = sessions.create().await;

        if let Some(llm) = llm {
            let chain = RagChain::new(initialized_retriever().await, llm, "Nairobi", nairobi_weather());
            handle.lock().await.select_region(Arc::new(chain));
        }

        Fixture {
            use_case: AnswerQuestionUseCase::new(translation, sessions.clone()),
            sessions,
            session_id,
            inbound,
            outbound,
        }
    }

    fn nairobi_weather() -> WeatherSummary {
        WeatherSummary {
            avg_temperature: 22.5,
            avg_precipitation: 3.1,
            missing_day_indices: Vec::new(),
            avg_wind_speed: None,
            days: 16,
        }
    }

    /// Records whether its own session could be locked while it was running.
    struct SessionAwareModel {
        session: SessionHandle,
        session_was_free: AtomicBool,
    }

    #[async_trait]
    impl LanguageModel for SessionAwareModel {
        async fn invoke(&self, prompt: &str) -> Result<String, LanguageModelError> {
            self.session_was_free
                .store(self.session.try_lock().is_ok(), Ordering::SeqCst);
            Ok(prompt.to_string())
        }

        fn model_name(&self) -> &str {
            "session-aware"
        }
    }

    fn ask(session_id: Uuid, text: &str) -> AnswerQuestionRequest {
        AnswerQuestionRequest {
            session_id,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_english_turn_skips_translation() {
        let f = fixture(Some(Arc::new(EchoModel))).await;

        let response = f
            .use_case
            .execute(ask(f.session_id, "Can I grow maize?"))
            .await
            .unwrap();

        assert_eq!(response.detected_language, Language::English);
        assert_eq!(response.translated_query, None);
        assert!(response.reply.contains("Question from user: Can I grow maize?"));
        assert_eq!(f.inbound.calls(), 0);
        assert_eq!(f.outbound.calls(), 0);
    }

    #[tokio::test]
    async fn test_swahili_turn_is_translated_both_ways() {
        let f = fixture(Some(Arc::new(EchoModel))).await;

        let response = f
            .use_case
            .execute(ask(f.session_id, "Je, naweza kupanda mahindi?"))
            .await
            .unwrap();

        assert_eq!(response.detected_language, Language::Swahili);
        assert_eq!(
            response.translated_query.as_deref(),
            Some("[inbound sw->en] Je, naweza kupanda mahindi?")
        );
        assert!(response.reply.starts_with("[outbound en->sw]"));
        assert_eq!(f.inbound.calls(), 1);
        assert_eq!(f.outbound.calls(), 1);
    }

    #[tokio::test]
    async fn test_turns_are_logged() {
        let f = fixture(Some(Arc::new(EchoModel))).await;
        f.use_case
            .execute(ask(f.session_id, "Can I grow maize?"))
            .await
            .unwrap();

        let session = f.sessions.get(f.session_id).await.unwrap();
        let state = session.lock().await;
        let roles: Vec<Role> = state.memory().turns().iter().map(|t| t.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(state.memory().turns()[0].text(), "Can I grow maize?");
    }

    #[tokio::test]
    async fn test_question_before_region_is_rejected() {
        let f = fixture(None).await;

        let error = f
            .use_case
            .execute(ask(f.session_id, "Can I grow maize?"))
            .await
            .unwrap_err();

        assert_eq!(error, AdvisoryError::RegionNotSelected);
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_session_usable() {
        let f = fixture(Some(Arc::new(FailingModel))).await;

        let error = f
            .use_case
            .execute(ask(f.session_id, "Can I grow maize?"))
            .await
            .unwrap_err();
        assert!(matches!(error, AdvisoryError::ModelInvocation(_)));

        let session = f.sessions.get(f.session_id).await.unwrap();
        assert!(session.lock().await.memory().turns().is_empty());

        // The next turn still reaches the chain.
        let again = f.use_case.execute(ask(f.session_id, "Can I grow beans?")).await;
        assert!(matches!(again, Err(AdvisoryError::ModelInvocation(_))));
    }

    #[tokio::test]
    async fn test_session_is_unlocked_while_model_runs() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let (session_id, handle) = sessions.create().await;
        let model = Arc::new(SessionAwareModel {
            session: handle.clone(),
            session_was_free: AtomicBool::new(false),
        });
        let chain = RagChain::new(
            initialized_retriever().await,
            model.clone(),
            "Nairobi",
            nairobi_weather(),
        );
        handle.lock().await.select_region(Arc::new(chain));

        let translation = Arc::new(TranslationPipeline::new(
            Arc::new(RecordingTranslator::new("inbound")),
            Arc::new(RecordingTranslator::new("outbound")),
        ));
        let use_case = AnswerQuestionUseCase::new(translation, sessions.clone());

        use_case
            .execute(ask(session_id, "Can I grow maize?"))
            .await
            .unwrap();

        assert!(model.session_was_free.load(Ordering::SeqCst));
        assert_eq!(handle.lock().await.memory().turns().len(), 2);
    }
}
