use async_trait::async_trait;

use crate::domain::entities::VectorIndex;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexStorageError {
    #[error("No persisted index at {0}")]
    NotFound(String),
    #[error("Refusing to deserialize {0}: loading persisted indexes was not allowed")]
    UntrustedLoadRefused(String),
    #[error("Incompatible index format: {0}")]
    Incompatible(String),
    #[error("Index could not be encoded: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    IoError(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Index files run through a binary decoder on load; callers must opt in
    /// to trusting whatever sits at the location.
    pub allow_dangerous_deserialization: bool,
}

#[async_trait]
pub trait IndexStorage: Send + Sync {
    async fn exists(&self) -> bool;

    async fn save(&self, index: &VectorIndex) -> Result<(), IndexStorageError>;

    async fn load(&self, options: LoadOptions) -> Result<VectorIndex, IndexStorageError>;

    fn location(&self) -> String;
}
