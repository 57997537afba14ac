use serde::{Deserialize, Serialize};

use super::Chunk;
use crate::domain::value_objects::EntryId;

/// A chunk together with its embedding, as stored in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    id: EntryId,
    chunk: Chunk,
    embedding: Vec<f32>,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        let id = EntryId::derive(
            chunk.metadata().source_id(),
            chunk.unit_index(),
            chunk.chunk_index(),
            chunk.text(),
        );
        Self {
            id,
            chunk,
            embedding,
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Squared euclidean distance to `query`. Callers guarantee equal dimensions.
    pub fn l2_distance(&self, query: &[f32]) -> f32 {
        self.embedding
            .iter()
            .zip(query.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Cosine similarity to `query`; zero when either vector has no magnitude.
    pub fn cosine_similarity(&self, query: &[f32]) -> f32 {
        let dot_product: f32 = self
            .embedding
            .iter()
            .zip(query.iter())
            .map(|(x, y)| x * y)
            .sum();
        let norm_a = magnitude(&self.embedding);
        let norm_b = magnitude(query);

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

fn magnitude(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{OriginType, SourceMetadata};

    fn entry(text: &str, embedding: Vec<f32>) -> IndexEntry {
        let metadata = SourceMetadata::new("Cereals", OriginType::Tabular, 2);
        IndexEntry::new(Chunk::new(text.to_string(), metadata, 0, 0, 0, 1), embedding)
    }

    #[test]
    fn test_entry_creation() {
        let entry = entry("maize", vec![0.1, 0.2, 0.3]);
        assert_eq!(entry.dimension(), 3);
        assert_eq!(entry.chunk().text(), "maize");
        assert_eq!(entry.id().as_str().len(), 64);
    }

    #[test]
    fn test_identical_chunks_share_id() {
        let a = entry("maize", vec![1.0, 0.0]);
        let b = entry("maize", vec![0.0, 1.0]);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_distances() {
        let entry = entry("maize", vec![1.0, 0.0, 0.0]);

        assert!((entry.cosine_similarity(&[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(entry.cosine_similarity(&[0.0, 1.0, 0.0]).abs() < 1e-6);
        assert_eq!(entry.cosine_similarity(&[0.0, 0.0, 0.0]), 0.0);
        assert!((entry.l2_distance(&[0.0, 1.0, 0.0]) - 2.0).abs() < 1e-6);
    }
}
