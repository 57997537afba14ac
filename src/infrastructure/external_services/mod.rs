pub mod document_extractors;
pub mod inference_client;
pub mod language_models;
pub mod open_meteo;
pub mod tokenizers;
pub mod translators;

pub use inference_client::InferenceEmbeddingProvider;
pub use open_meteo::OpenMeteoClient;
