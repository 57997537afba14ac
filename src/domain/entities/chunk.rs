use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SourceMetadata;

/// A contiguous, token-bounded slice of a text unit.
///
/// `token_start..token_end` is the half-open token span the chunk covers in
/// its parent unit; `unit_index` is the parent's position in the loaded
/// corpus and `chunk_index` the chunk's position within the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    text: String,
    metadata: SourceMetadata,
    unit_index: usize,
    chunk_index: usize,
    token_start: usize,
    token_end: usize,
}

impl Chunk {
    pub fn new(
        text: String,
        metadata: SourceMetadata,
        unit_index: usize,
        chunk_index: usize,
        token_start: usize,
        token_end: usize,
    ) -> Self {
        Self {
            text,
            metadata,
            unit_index,
            chunk_index,
            token_start,
            token_end,
        }
    }

    // Getters
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    pub fn unit_index(&self) -> usize {
        self.unit_index
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    #[cfg(test)]
    pub fn token_span(&self) -> (usize, usize) {
        (self.token_start, self.token_end)
    }
}
