use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SourceMetadata;

/// A source record flattened into a single blob of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    content: String,
    metadata: SourceMetadata,
}

impl TextUnit {
    pub fn new(content: String, metadata: SourceMetadata) -> Self {
        Self { content, metadata }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}
