pub mod document_extractor;
pub mod embedding_provider;
pub mod index_storage;
pub mod language_model;
pub mod session_store;
pub mod tokenizer;
pub mod translator;
pub mod weather_provider;

pub use document_extractor::{DocumentExtractor, SpreadsheetReader};
pub use embedding_provider::EmbeddingProvider;
pub use index_storage::{IndexStorage, LoadOptions};
pub use language_model::LanguageModel;
pub use session_store::{SessionHandle, SessionStore};
pub use tokenizer::Tokenizer;
pub use translator::Translator;
pub use weather_provider::{ForecastProvider, Geocoder};
