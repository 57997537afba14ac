use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::index_storage::{IndexStorage, IndexStorageError, LoadOptions};
use crate::domain::entities::{DistanceMetric, IndexEntry, VectorIndex};

pub const FORMAT_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "entries.bin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub metric: DistanceMetric,
    pub dimension: usize,
    pub entry_count: usize,
    pub model_name: String,
    pub built_at: DateTime<Utc>,
}

/// Persists an index as a directory holding a JSON manifest and the
/// bincode-encoded entries.
pub struct LocalIndexStorage {
    base_path: PathBuf,
}

impl LocalIndexStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn manifest_path(&self) -> PathBuf {
        self.base_path.join(MANIFEST_FILE)
    }

    fn entries_path(&self) -> PathBuf {
        self.base_path.join(ENTRIES_FILE)
    }

    pub async fn read_manifest(&self) -> Result<IndexManifest, IndexStorageError> {
        let raw = fs::read(self.manifest_path()).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IndexStorageError::NotFound(self.location())
            } else {
                IndexStorageError::IoError(e.to_string())
            }
        })?;

        let manifest: IndexManifest = serde_json::from_slice(&raw)
            .map_err(|e| IndexStorageError::Incompatible(format!("bad manifest: {}", e)))?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(IndexStorageError::Incompatible(format!(
                "format version {} is not supported (expected {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }

        Ok(manifest)
    }

    // Written next to the target, then renamed over it.
    async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), IndexStorageError> {
        let staging = path.with_extension("tmp");
        fs::write(&staging, data)
            .await
            .map_err(|e| IndexStorageError::IoError(e.to_string()))?;
        fs::rename(&staging, path)
            .await
            .map_err(|e| IndexStorageError::IoError(e.to_string()))
    }
}

#[async_trait]
impl IndexStorage for LocalIndexStorage {
    async fn exists(&self) -> bool {
        fs::try_exists(self.manifest_path()).await.unwrap_or(false)
    }

    async fn save(&self, index: &VectorIndex) -> Result<(), IndexStorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| IndexStorageError::IoError(e.to_string()))?;

        let entries = bincode::serialize(index.entries())
            .map_err(|e| IndexStorageError::Serialization(e.to_string()))?;
        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            metric: index.metric(),
            dimension: index.dimension(),
            entry_count: index.len(),
            model_name: index.model_name().to_string(),
            built_at: index.built_at(),
        };
        let manifest = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| IndexStorageError::Serialization(e.to_string()))?;

        // Entries first: a manifest only ever points at complete entries.
        Self::write_atomic(&self.entries_path(), &entries).await?;
        Self::write_atomic(&self.manifest_path(), &manifest).await?;

        tracing::info!("Saved index with {} entries to {}", index.len(), self.location());
        Ok(())
    }

    async fn load(&self, options: LoadOptions) -> Result<VectorIndex, IndexStorageError> {
        if !options.allow_dangerous_deserialization {
            return Err(IndexStorageError::UntrustedLoadRefused(self.location()));
        }

        let manifest = self.read_manifest().await?;
        let raw = fs::read(self.entries_path())
            .await
            .map_err(|e| IndexStorageError::IoError(e.to_string()))?;

        let entries = tokio::task::spawn_blocking(move || bincode::deserialize::<Vec<IndexEntry>>(&raw))
            .await
            .map_err(|e| IndexStorageError::IoError(e.to_string()))?
            .map_err(|e| IndexStorageError::Incompatible(format!("bad entries: {}", e)))?;

        if entries.len() != manifest.entry_count {
            return Err(IndexStorageError::Incompatible(format!(
                "manifest lists {} entries but {} were stored",
                manifest.entry_count,
                entries.len()
            )));
        }

        VectorIndex::from_entries(
            manifest.dimension,
            manifest.metric,
            manifest.model_name,
            manifest.built_at,
            entries,
        )
        .map_err(|e| IndexStorageError::Incompatible(e.to_string()))
    }

    fn location(&self) -> String {
        self.base_path.display().to_string()
    }
}
