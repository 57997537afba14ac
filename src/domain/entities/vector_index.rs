use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{Chunk, IndexEntry};
use crate::domain::value_objects::EntryId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VectorIndexError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Squared euclidean distance, smaller is closer.
    L2,
    /// Cosine similarity, larger is closer.
    Cosine,
}

impl DistanceMetric {
    fn rank(&self, a: f32, b: f32) -> Ordering {
        match self {
            DistanceMetric::L2 => a.total_cmp(&b),
            DistanceMetric::Cosine => b.total_cmp(&a),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entry_id: EntryId,
    pub chunk: Chunk,
    pub score: f32,
}

/// Flat (exhaustive) similarity index over a fixed set of entries.
///
/// The entry set is fixed at construction; a rebuild produces a new index.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    metric: DistanceMetric,
    model_name: String,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn from_entries(
        dimension: usize,
        metric: DistanceMetric,
        model_name: impl Into<String>,
        built_at: DateTime<Utc>,
        entries: Vec<IndexEntry>,
    ) -> Result<Self, VectorIndexError> {
        if let Some(bad) = entries.iter().find(|e| e.dimension() != dimension) {
            return Err(VectorIndexError::DimensionMismatch {
                expected: dimension,
                actual: bad.dimension(),
            });
        }

        Ok(Self {
            dimension,
            metric,
            model_name: model_name.into(),
            built_at,
            entries,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the `k` closest entries to `query`, best first. Ties keep
    /// insertion order so results are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(position, entry)| {
                let score = match self.metric {
                    DistanceMetric::L2 => entry.l2_distance(query),
                    DistanceMetric::Cosine => entry.cosine_similarity(query),
                };
                (position, score)
            })
            .collect();

        scored.sort_by(|(pa, sa), (pb, sb)| self.metric.rank(*sa, *sb).then(pa.cmp(pb)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| {
                let entry = &self.entries[position];
                SearchHit {
                    entry_id: entry.id().clone(),
                    chunk: entry.chunk().clone(),
                    score,
                }
            })
            .collect())
    }
}
