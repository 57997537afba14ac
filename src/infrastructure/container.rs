use std::sync::Arc;
use std::time::Duration;

use crate::{
    application::{
        errors::{AdvisoryError, LoadError},
        ports::{
            DocumentExtractor, EmbeddingProvider, IndexStorage, LanguageModel, SessionStore,
            SpreadsheetReader, Tokenizer, Translator,
        },
        services::{
            Chunker, DocumentLoader, Retriever, TranslationPipeline, VectorIndexManager,
            WeatherService,
        },
        use_cases::{
            AnswerQuestionUseCase, GetHistoryUseCase, SelectRegionUseCase, StartSessionUseCase,
        },
    },
    infrastructure::{
        config::{AppConfig, ConfigError, LlmProvider},
        external_services::{
            InferenceEmbeddingProvider, OpenMeteoClient,
            document_extractors::{CalamineSpreadsheetReader, PdfExtractor},
            inference_client::InferenceClient,
            language_models::{CohereLanguageModel, OpenAiCompatibleLanguageModel},
            tokenizers::{HuggingFaceTokenizer, WhitespaceTokenizer},
            translators::{GoogleTranslator, HuggingFaceTranslator},
        },
        file_system::LocalIndexStorage,
        session::InMemorySessionStore,
    },
    presentation::http::handlers::SessionHandler,
};

/// Failures that stop the process from serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("knowledge base could not be loaded: {0}")]
    DocumentLoad(LoadError),
    #[error("vector index unavailable: {0}")]
    Index(AdvisoryError),
    #[error("client setup failed: {0}")]
    ClientSetup(String),
    #[error("server error: {0}")]
    Server(String),
}

impl From<AdvisoryError> for StartupError {
    fn from(error: AdvisoryError) -> Self {
        match error {
            AdvisoryError::Load(load) => StartupError::DocumentLoad(load),
            other => StartupError::Index(other),
        }
    }
}

fn client_setup(component: &str) -> impl Fn(reqwest::Error) -> StartupError + '_ {
    move |e| StartupError::ClientSetup(format!("{}: {}", component, e))
}

/// The application-session context: built once at startup and shared by
/// every request handler.
pub struct AppContainer {
    pub retriever: Arc<Retriever>,
    pub session_handler: Arc<SessionHandler>,
}

impl AppContainer {
    pub fn new(config: AppConfig) -> Result<Self, StartupError> {
        // Knowledge base readers
        let spreadsheet_reader: Arc<dyn SpreadsheetReader> = Arc::new(CalamineSpreadsheetReader::new());
        let document_extractor: Arc<dyn DocumentExtractor> = Arc::new(PdfExtractor::new());
        let tokenizer: Arc<dyn Tokenizer> = match &config.chunking.tokenizer_path {
            Some(path) => Arc::new(
                HuggingFaceTokenizer::from_file(path)
                    .map_err(|e| StartupError::ClientSetup(e.to_string()))?,
            ),
            None => Arc::new(WhitespaceTokenizer::new()),
        };

        // External services
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(InferenceEmbeddingProvider::new(
            InferenceClient::new(config.embeddings.clone()).map_err(client_setup("embeddings"))?,
        ));
        let index_storage: Arc<dyn IndexStorage> =
            Arc::new(LocalIndexStorage::new(config.knowledge_base.index_path.clone()));

        let llm: Arc<dyn LanguageModel> = match config.llm.provider {
            LlmProvider::Cohere => Arc::new(
                CohereLanguageModel::new(config.llm.client.clone()).map_err(client_setup("cohere"))?,
            ),
            LlmProvider::OpenAi => Arc::new(
                OpenAiCompatibleLanguageModel::new(config.llm.client.clone())
                    .map_err(client_setup("openai"))?,
            ),
        };

        let inbound: Arc<dyn Translator> = Arc::new(
            HuggingFaceTranslator::new(config.translation.inbound.clone())
                .map_err(client_setup("inbound translation"))?,
        );
        let outbound: Arc<dyn Translator> = Arc::new(
            GoogleTranslator::new(config.translation.outbound.clone())
                .map_err(client_setup("outbound translation"))?,
        );

        let weather_client = Arc::new(
            OpenMeteoClient::new(config.weather.client.clone()).map_err(client_setup("weather"))?,
        );

        let session_store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::with_limits(
            config.sessions.max_sessions,
            Duration::from_secs(config.sessions.idle_ttl_secs),
        ));

        // Application services
        let index_manager = Arc::new(VectorIndexManager::new(
            embedding_provider,
            index_storage,
            config.index.clone(),
        ));
        let chunker = Chunker::new(
            tokenizer,
            config.chunking.chunk_size,
            config.chunking.chunk_overlap,
        )
        .map_err(|e| StartupError::Index(AdvisoryError::Chunking(e.to_string())))?;
        let retriever = Arc::new(
            Retriever::new(
                DocumentLoader::new(spreadsheet_reader, document_extractor),
                chunker,
                index_manager,
                config.knowledge_base.sources.clone(),
            )
            .with_top_k(config.retrieval_top_k),
        );
        let weather_service = Arc::new(WeatherService::new(
            weather_client.clone(),
            weather_client,
            config.weather.forecast_days,
        ));
        let translation = Arc::new(TranslationPipeline::new(inbound, outbound));

        // Use cases
        let start_session_use_case = Arc::new(StartSessionUseCase::new(
            retriever.clone(),
            session_store.clone(),
        ));
        let select_region_use_case = Arc::new(SelectRegionUseCase::new(
            retriever.clone(),
            weather_service,
            llm,
            session_store.clone(),
        ));
        let answer_question_use_case = Arc::new(AnswerQuestionUseCase::new(
            translation,
            session_store.clone(),
        ));
        let get_history_use_case = Arc::new(GetHistoryUseCase::new(session_store));

        // HTTP handlers
        let session_handler = Arc::new(SessionHandler::new(
            start_session_use_case,
            select_region_use_case,
            answer_question_use_case,
            get_history_use_case,
        ));

        Ok(Self {
            retriever,
            session_handler,
        })
    }

    /// Loads or builds the index before any session is served.
    pub async fn warm_up(&self) -> Result<(), StartupError> {
        let stats = self.retriever.retrieve().await?;
        tracing::info!(
            "Knowledge base ready: {} chunks indexed ({:?})",
            stats.indexed_entries,
            stats.origin
        );
        Ok(())
    }
}
