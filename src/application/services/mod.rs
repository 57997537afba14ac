pub mod chunker;
pub mod document_loader;
pub mod rag_chain;
pub mod retriever;
pub mod translation_pipeline;
pub mod vector_index_manager;
pub mod weather_service;

pub use chunker::Chunker;
pub use document_loader::{DocumentLoader, KnowledgeBaseSources};
pub use rag_chain::RagChain;
pub use retriever::{RETRIEVAL_TOP_K, RetrievalStats, Retriever};
pub use translation_pipeline::TranslationPipeline;
pub use vector_index_manager::{IndexConfig, IndexOrigin, MAX_TOP_K, VectorIndexManager};
pub use weather_service::{RegionOutlook, WeatherService};
