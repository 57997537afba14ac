use uuid::Uuid;

use crate::application::ports::embedding_provider::EmbeddingProviderError;
use crate::application::ports::language_model::LanguageModelError;
use crate::application::ports::translator::TranslatorError;
use crate::application::ports::weather_provider::WeatherProviderError;

/// Knowledge-base load failures. Sheet failures are absorbed by the loader;
/// the other variants abort index construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("workbook {path} could not be opened: {reason}")]
    Workbook { path: String, reason: String },
    #[error("sheet '{sheet}' could not be loaded: {reason}")]
    Sheet { sheet: String, reason: String },
    #[error("document {path} could not be loaded: {reason}")]
    Document { path: String, reason: String },
}

/// Failures a single turn or session command can run into. None of them
/// leaves shared state behind in a broken shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvisoryError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("the vector index has not been built or loaded yet")]
    IndexNotBuilt,
    #[error("the retriever has not been initialized yet")]
    NotInitialized,
    #[error("persisted index could not be loaded: {0}")]
    IndexDeserialization(String),
    #[error("index could not be persisted: {0}")]
    IndexPersistence(String),
    #[error("text could not be chunked: {0}")]
    Chunking(String),
    #[error("location not found: {0}")]
    LocationNotFound(String),
    #[error("weather forecast could not be fetched: {0}")]
    WeatherFetch(String),
    #[error("incomplete weather data: {0}")]
    IncompleteWeatherData(String),
    #[error("translation failed: {0}")]
    Translation(String),
    #[error("language model call failed: {0}")]
    ModelInvocation(String),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("no region has been selected for this session")]
    RegionNotSelected,
    #[error("session {0} not found")]
    SessionNotFound(Uuid),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AdvisoryError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            AdvisoryError::Load(_) => "LOAD_FAILED",
            AdvisoryError::IndexNotBuilt => "INDEX_NOT_BUILT",
            AdvisoryError::NotInitialized => "NOT_INITIALIZED",
            AdvisoryError::IndexDeserialization(_) => "INDEX_DESERIALIZATION_FAILED",
            AdvisoryError::IndexPersistence(_) => "INDEX_PERSISTENCE_FAILED",
            AdvisoryError::Chunking(_) => "CHUNKING_FAILED",
            AdvisoryError::LocationNotFound(_) => "LOCATION_NOT_FOUND",
            AdvisoryError::WeatherFetch(_) => "WEATHER_FETCH_FAILED",
            AdvisoryError::IncompleteWeatherData(_) => "INCOMPLETE_WEATHER_DATA",
            AdvisoryError::Translation(_) => "TRANSLATION_FAILED",
            AdvisoryError::ModelInvocation(_) => "MODEL_INVOCATION_FAILED",
            AdvisoryError::Embedding(_) => "EMBEDDING_FAILED",
            AdvisoryError::RegionNotSelected => "REGION_NOT_SELECTED",
            AdvisoryError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            AdvisoryError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

impl From<WeatherProviderError> for AdvisoryError {
    fn from(error: WeatherProviderError) -> Self {
        match error {
            WeatherProviderError::LocationNotFound(region) => AdvisoryError::LocationNotFound(region),
            other => AdvisoryError::WeatherFetch(other.to_string()),
        }
    }
}

impl From<TranslatorError> for AdvisoryError {
    fn from(error: TranslatorError) -> Self {
        AdvisoryError::Translation(error.to_string())
    }
}

impl From<LanguageModelError> for AdvisoryError {
    fn from(error: LanguageModelError) -> Self {
        AdvisoryError::ModelInvocation(error.to_string())
    }
}

impl From<EmbeddingProviderError> for AdvisoryError {
    fn from(error: EmbeddingProviderError) -> Self {
        AdvisoryError::Embedding(error.to_string())
    }
}
