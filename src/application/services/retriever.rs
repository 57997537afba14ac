use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;

use crate::application::errors::AdvisoryError;
use crate::application::services::chunker::Chunker;
use crate::application::services::document_loader::{DocumentLoader, KnowledgeBaseSources};
use crate::application::services::vector_index_manager::{IndexOrigin, VectorIndexManager};
use crate::domain::entities::{Chunk, SearchHit};

pub const RETRIEVAL_TOP_K: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalStats {
    pub text_units: usize,
    pub chunks: usize,
    pub indexed_entries: usize,
    pub origin: IndexOrigin,
}

/// Runs load, chunk and load-or-build once per process and answers
/// query-to-documents lookups afterwards.
pub struct Retriever {
    loader: DocumentLoader,
    chunker: Chunker,
    index_manager: Arc<VectorIndexManager>,
    sources: KnowledgeBaseSources,
    top_k: usize,
    initialized: OnceCell<RetrievalStats>,
}

impl Retriever {
    pub fn new(
        loader: DocumentLoader,
        chunker: Chunker,
        index_manager: Arc<VectorIndexManager>,
        sources: KnowledgeBaseSources,
    ) -> Self {
        Self {
            loader,
            chunker,
            index_manager,
            sources,
            top_k: RETRIEVAL_TOP_K,
            initialized: OnceCell::new(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.clamp(1, RETRIEVAL_TOP_K);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    /// Concurrent callers share one initialization; a failed attempt leaves
    /// the retriever uninitialized so it can be retried.
    pub async fn retrieve(&self) -> Result<RetrievalStats, AdvisoryError> {
        self.initialized
            .get_or_try_init(|| self.initialize())
            .await
            .copied()
    }

    async fn initialize(&self) -> Result<RetrievalStats, AdvisoryError> {
        let started = Instant::now();

        let units = self.loader.load(&self.sources).await?;
        let chunks = self
            .chunker
            .split_units(&units)
            .map_err(|e| AdvisoryError::Chunking(e.to_string()))?;
        let (index, origin) = self.index_manager.load_or_build(&chunks).await?;
        if index.is_empty() {
            tracing::warn!("Knowledge base index is empty; answers will carry no context");
        }

        let stats = RetrievalStats {
            text_units: units.len(),
            chunks: chunks.len(),
            indexed_entries: index.len(),
            origin,
        };

        tracing::info!(
            "Retriever ready in {:?}: {} units, {} chunks, {} entries ({:?})",
            started.elapsed(),
            stats.text_units,
            stats.chunks,
            stats.indexed_entries,
            stats.origin
        );

        Ok(stats)
    }

    pub async fn get_scored_docs(&self, query: &str) -> Result<Vec<SearchHit>, AdvisoryError> {
        if !self.is_initialized() {
            return Err(AdvisoryError::NotInitialized);
        }

        let started = Instant::now();
        let hits = self.index_manager.query(query, self.top_k).await?;
        tracing::debug!("Retrieved {} chunks in {:?}", hits.len(), started.elapsed());
        for hit in &hits {
            let metadata = hit.chunk.metadata();
            tracing::trace!(
                "  {} {} '{}' #{} (score {:.4})",
                hit.entry_id,
                metadata.origin(),
                metadata.source_id(),
                metadata.position(),
                hit.score
            );
        }

        Ok(hits)
    }

    /// Matched chunks, most similar first.
    pub async fn get_docs(&self, query: &str) -> Result<Vec<Chunk>, AdvisoryError> {
        Ok(self
            .get_scored_docs(query)
            .await?
            .into_iter()
            .map(|hit| hit.chunk)
            .collect())
    }
}
