use std::sync::{Arc, RwLock};

use chrono::Utc;
use futures::{StreamExt, TryStreamExt, stream};

use crate::application::errors::AdvisoryError;
use crate::application::ports::embedding_provider::{BatchEmbeddingRequest, EmbeddingRequest};
use crate::application::ports::{EmbeddingProvider, IndexStorage, LoadOptions};
use crate::domain::entities::{Chunk, DistanceMetric, IndexEntry, SearchHit, VectorIndex};

/// Upper bound on hits a single query may request.
pub const MAX_TOP_K: usize = 15;

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub max_top_k: usize,
    pub batch_size: usize,
    pub embedding_concurrency: usize,
    pub load_options: LoadOptions,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            metric: DistanceMetric::L2,
            max_top_k: MAX_TOP_K,
            batch_size: 32,
            embedding_concurrency: 4,
            load_options: LoadOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    Loaded,
    Built,
}

/// Owns the embedding-backed index: builds it from chunks, persists it, loads
/// it back and answers similarity queries against it.
pub struct VectorIndexManager {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    storage: Arc<dyn IndexStorage>,
    config: IndexConfig,
    current: RwLock<Option<Arc<VectorIndex>>>,
}

impl VectorIndexManager {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        storage: Arc<dyn IndexStorage>,
        config: IndexConfig,
    ) -> Self {
        Self {
            embedding_provider,
            storage,
            config,
            current: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn current(&self) -> Option<Arc<VectorIndex>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn install(&self, index: Arc<VectorIndex>) {
        match self.current.write() {
            Ok(mut guard) => *guard = Some(index),
            Err(poisoned) => *poisoned.into_inner() = Some(index),
        }
    }

    /// Embeds every chunk, persists the resulting index and makes it the
    /// active one.
    pub async fn build(&self, chunks: &[Chunk]) -> Result<Arc<VectorIndex>, AdvisoryError> {
        let (model_name, _) = self.embedding_provider.model_info();
        let batch_size = self.config.batch_size.max(1);
        let text_batches: Vec<Vec<String>> = chunks
            .chunks(batch_size)
            .map(|batch| batch.iter().map(|c| c.text().to_string()).collect())
            .collect();

        tracing::info!(
            "Embedding {} chunks in {} batches with {}",
            chunks.len(),
            text_batches.len(),
            model_name
        );

        let embedded: Vec<Vec<Vec<f32>>> = stream::iter(
            text_batches
                .into_iter()
                .map(|texts| self.embed_batch(texts)),
        )
        .buffered(self.config.embedding_concurrency.max(1))
        .try_collect()
        .await?;

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .cloned()
            .zip(embedded.into_iter().flatten())
            .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding))
            .collect();

        let index = VectorIndex::from_entries(
            self.config.dimension,
            self.config.metric,
            model_name,
            Utc::now(),
            entries,
        )
        .map_err(|e| AdvisoryError::Embedding(e.to_string()))?;

        self.storage
            .save(&index)
            .await
            .map_err(|e| AdvisoryError::IndexPersistence(e.to_string()))?;

        tracing::info!(
            "Built index with {} entries at {}",
            index.len(),
            self.storage.location()
        );

        let index = Arc::new(index);
        self.install(index.clone());
        Ok(index)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AdvisoryError> {
        let expected = texts.len();
        let response = self
            .embedding_provider
            .generate_embeddings(BatchEmbeddingRequest { texts })
            .await?;

        if response.embeddings.len() != expected {
            return Err(AdvisoryError::Embedding(format!(
                "expected {} embeddings, provider returned {}",
                expected,
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings)
    }

    /// Loads the persisted index and makes it the active one.
    pub async fn load(&self) -> Result<Arc<VectorIndex>, AdvisoryError> {
        let index = self
            .storage
            .load(self.config.load_options)
            .await
            .map_err(|e| AdvisoryError::IndexDeserialization(e.to_string()))?;

        if index.dimension() != self.config.dimension {
            return Err(AdvisoryError::IndexDeserialization(format!(
                "index at {} has dimension {}, expected {}",
                self.storage.location(),
                index.dimension(),
                self.config.dimension
            )));
        }

        tracing::info!(
            "Loaded index with {} entries from {}",
            index.len(),
            self.storage.location()
        );

        let index = Arc::new(index);
        self.install(index.clone());
        Ok(index)
    }

    /// Loads the persisted index when one exists and loading is trusted,
    /// otherwise builds and persists a fresh one from `chunks`.
    pub async fn load_or_build(
        &self,
        chunks: &[Chunk],
    ) -> Result<(Arc<VectorIndex>, IndexOrigin), AdvisoryError> {
        if !self.storage.exists().await {
            tracing::info!(
                "No persisted index at {}, building a new one",
                self.storage.location()
            );
            return Ok((self.build(chunks).await?, IndexOrigin::Built));
        }

        if !self.config.load_options.allow_dangerous_deserialization {
            tracing::warn!(
                "Persisted index at {} is not trusted for loading, rebuilding it",
                self.storage.location()
            );
            return Ok((self.build(chunks).await?, IndexOrigin::Built));
        }

        let index = self.load().await?;
        if index.len() != chunks.len() {
            tracing::warn!(
                "Persisted index holds {} entries but the knowledge base produced {} chunks; delete {} to rebuild",
                index.len(),
                chunks.len(),
                self.storage.location()
            );
        }

        Ok((index, IndexOrigin::Loaded))
    }

    /// Embeds `text` and returns up to `k` nearest chunks, best first.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchHit>, AdvisoryError> {
        if text.trim().is_empty() {
            return Err(AdvisoryError::InvalidInput(
                "query text cannot be empty".to_string(),
            ));
        }

        let index = self.current().ok_or(AdvisoryError::IndexNotBuilt)?;
        let k = k.min(self.config.max_top_k);

        let response = self
            .embedding_provider
            .generate_embedding(EmbeddingRequest {
                text: text.to_string(),
            })
            .await?;

        index
            .search(&response.embedding, k)
            .map_err(|e| AdvisoryError::Embedding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{OriginType, SourceMetadata};
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::file_system::LocalIndexStorage;
    use crate::test_support::{HashingEmbedder, InMemoryIndexStorage, TEST_DIMENSION};

    fn chunk(text: &str, position: u32) -> Chunk {
        Chunk::new(
            text.to_string(),
            SourceMetadata::new("Cereals", OriginType::Tabular, position),
            position as usize,
            0,
            0,
            text.split_whitespace().count(),
        )
    }

    fn corpus() -> Vec<Chunk> {
        vec![
            chunk("maize planting long rains nakuru", 2),
            chunk("sorghum tolerates drought in eastern kenya", 3),
            chunk("cassava cuttings are planted at the start of rains", 4),
            chunk("beans need well drained soil", 5),
        ]
    }

    fn config() -> IndexConfig {
        IndexConfig {
            dimension: TEST_DIMENSION,
            batch_size: 3,
            embedding_concurrency: 2,
            load_options: LoadOptions {
                allow_dangerous_deserialization: true,
            },
            ..IndexConfig::default()
        }
    }

    fn manager(storage: Arc<InMemoryIndexStorage>) -> VectorIndexManager {
        VectorIndexManager::new(Arc::new(HashingEmbedder::new()), storage, config())
    }

    #[tokio::test]
    async fn test_query_before_build_fails() {
        let manager = manager(Arc::new(InMemoryIndexStorage::new()));

        let error = manager.query("maize", 3).await.unwrap_err();

        assert_eq!(error, AdvisoryError::IndexNotBuilt);
    }

    #[tokio::test]
    async fn test_build_preserves_chunk_order_across_batches() {
        let storage = Arc::new(InMemoryIndexStorage::new());
        let manager = manager(storage.clone());
        let chunks = corpus();

        let index = manager.build(&chunks).await.unwrap();

        assert_eq!(index.len(), chunks.len());
        let texts: Vec<&str> = index.entries().iter().map(|e| e.chunk().text()).collect();
        let expected: Vec<&str> = chunks.iter().map(|c| c.text()).collect();
        assert_eq!(texts, expected);
        assert_eq!(storage.save_count(), 1);
    }

    #[tokio::test]
    async fn test_build_runs_on_spawned_task() {
        let storage = Arc::new(InMemoryIndexStorage::new());
        let manager = Arc::new(manager(storage.clone()));

        let task = tokio::spawn({
            let manager = manager.clone();
            async move {
                let chunks = corpus();
                manager
                    .load_or_build(&chunks)
                    .await
                    .map(|(index, origin)| (index.len(), origin))
            }
        });

        let (len, origin) = task.await.unwrap().unwrap();
        assert_eq!(len, corpus().len());
        assert_eq!(origin, IndexOrigin::Built);
        assert_eq!(storage.save_count(), 1);
    }

    #[tokio::test]
    async fn test_query_finds_closest_chunk_first() {
        let manager = manager(Arc::new(InMemoryIndexStorage::new()));
        manager.build(&corpus()).await.unwrap();

        let hits = manager.query("sorghum drought", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert!(hits[0].chunk.text().starts_with("sorghum"));
        assert!(hits[0].score <= hits[1].score);
    }

    #[tokio::test]
    async fn test_query_caps_k() {
        let manager = manager(Arc::new(InMemoryIndexStorage::new()));
        let chunks: Vec<Chunk> = (0..20)
            .map(|i| chunk(&format!("advice number {}", i), i + 2))
            .collect();
        manager.build(&chunks).await.unwrap();

        let hits = manager.query("advice", 50).await.unwrap();

        assert_eq!(hits.len(), MAX_TOP_K);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let manager = manager(Arc::new(InMemoryIndexStorage::new()));
        manager.build(&corpus()).await.unwrap();

        let error = manager.query("  ", 3).await.unwrap_err();

        assert!(matches!(error, AdvisoryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_load_or_build_reuses_persisted_index() {
        let storage = Arc::new(InMemoryIndexStorage::new());
        let first = manager(storage.clone());
        let (built, origin) = first.load_or_build(&corpus()).await.unwrap();
        assert_eq!(origin, IndexOrigin::Built);

        let second = manager(storage.clone());
        let (loaded, origin) = second.load_or_build(&corpus()).await.unwrap();

        assert_eq!(origin, IndexOrigin::Loaded);
        assert_eq!(loaded.len(), built.len());
        assert_eq!(storage.save_count(), 1);

        let before = first.query("cassava cuttings", 3).await.unwrap();
        let after = second.query("cassava cuttings", 3).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_untrusted_load_is_refused() {
        let storage = Arc::new(InMemoryIndexStorage::new());
        manager(storage.clone()).build(&corpus()).await.unwrap();

        let untrusted = VectorIndexManager::new(
            Arc::new(HashingEmbedder::new()),
            storage,
            IndexConfig {
                dimension: TEST_DIMENSION,
                ..IndexConfig::default()
            },
        );

        let error = untrusted.load().await.unwrap_err();

        assert!(matches!(error, AdvisoryError::IndexDeserialization(_)));
        assert!(untrusted.current().is_none());
    }

    #[tokio::test]
    async fn test_load_rejects_dimension_change() {
        let storage = Arc::new(InMemoryIndexStorage::new());
        manager(storage.clone()).build(&corpus()).await.unwrap();

        let resized = VectorIndexManager::new(
            Arc::new(HashingEmbedder::new()),
            storage,
            IndexConfig {
                dimension: TEST_DIMENSION * 2,
                ..config()
            },
        );

        assert!(matches!(
            resized.load().await,
            Err(AdvisoryError::IndexDeserialization(_))
        ));
    }

    #[tokio::test]
    async fn test_untrusted_startup_rebuilds() {
        let storage = Arc::new(InMemoryIndexStorage::new());
        manager(storage.clone()).build(&corpus()).await.unwrap();

        let untrusted = VectorIndexManager::new(
            Arc::new(HashingEmbedder::new()),
            storage.clone(),
            IndexConfig {
                dimension: TEST_DIMENSION,
                ..IndexConfig::default()
            },
        );
        let (index, origin) = untrusted.load_or_build(&corpus()).await.unwrap();

        assert_eq!(origin, IndexOrigin::Built);
        assert_eq!(index.len(), corpus().len());
        assert_eq!(storage.save_count(), 2);
    }

    #[tokio::test]
    async fn test_restart_with_default_config_loads_saved_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_lookup(|key| match key {
            "LLM_API_KEY" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        let index_config = IndexConfig {
            dimension: TEST_DIMENSION,
            ..config.index.clone()
        };
        let startup = || {
            VectorIndexManager::new(
                Arc::new(HashingEmbedder::new()),
                Arc::new(LocalIndexStorage::new(
                    dir.path().join(&config.knowledge_base.index_path),
                )),
                index_config.clone(),
            )
        };

        let (_, first) = startup().load_or_build(&corpus()).await.unwrap();
        let (loaded, second) = startup().load_or_build(&corpus()).await.unwrap();

        assert_eq!(first, IndexOrigin::Built);
        assert_eq!(second, IndexOrigin::Loaded);
        assert_eq!(loaded.len(), corpus().len());
    }
}
