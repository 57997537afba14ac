use std::sync::Arc;

use crate::application::ports::Tokenizer;
use crate::domain::entities::{Chunk, TextUnit};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 25;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChunkingError {
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    InvalidWindow { size: usize, overlap: usize },
    #[error("tokenizer failed on '{source_id}': {reason}")]
    Tokenizer { source_id: String, reason: String },
}

/// Splits text units into overlapping windows of tokens.
///
/// Windows start every `chunk_size - chunk_overlap` tokens, so a unit of `n`
/// tokens yields `ceil(n / (chunk_size - chunk_overlap))` chunks and each
/// chunk repeats the last `chunk_overlap` tokens of its predecessor.
pub struct Chunker {
    tokenizer: Arc<dyn Tokenizer>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Self, ChunkingError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(ChunkingError::InvalidWindow {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }

        Ok(Self {
            tokenizer,
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split_units(&self, units: &[TextUnit]) -> Result<Vec<Chunk>, ChunkingError> {
        let mut chunks = Vec::new();
        for (unit_index, unit) in units.iter().enumerate() {
            chunks.extend(self.split_unit(unit_index, unit)?);
        }

        tracing::info!(
            "Split {} text units into {} chunks (size {}, overlap {}, tokenizer {})",
            units.len(),
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap,
            self.tokenizer.name()
        );

        Ok(chunks)
    }

    pub fn split_unit(&self, unit_index: usize, unit: &TextUnit) -> Result<Vec<Chunk>, ChunkingError> {
        let content = unit.content();
        let offsets = self
            .tokenizer
            .token_offsets(content)
            .map_err(|e| ChunkingError::Tokenizer {
                source_id: unit.metadata().source_id().to_string(),
                reason: e.to_string(),
            })?;

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < offsets.len() {
            let end = (start + self.chunk_size).min(offsets.len());
            let byte_start = floor_char_boundary(content, offsets[start].0);
            let byte_end = ceil_char_boundary(content, offsets[end - 1].1);

            chunks.push(Chunk::new(
                content[byte_start..byte_end].to_string(),
                unit.metadata().clone(),
                unit_index,
                chunks.len(),
                start,
                end,
            ));

            start += step;
        }

        Ok(chunks)
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{OriginType, SourceMetadata};
    use crate::infrastructure::external_services::tokenizers::WhitespaceTokenizer;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(Arc::new(WhitespaceTokenizer::new()), size, overlap).unwrap()
    }

    fn unit(words: usize) -> TextUnit {
        let content = (0..words)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        TextUnit::new(content, SourceMetadata::new("advisory.pdf", OriginType::Document, 1))
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        let result = Chunker::new(Arc::new(WhitespaceTokenizer::new()), 25, 25);
        assert_eq!(
            result.err(),
            Some(ChunkingError::InvalidWindow {
                size: 25,
                overlap: 25
            })
        );
    }

    #[test]
    fn test_short_unit_is_single_chunk() {
        let chunks = chunker(500, 25).split_unit(0, &unit(10)).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].token_span(), (0, 10));
        assert_eq!(chunks[0].text(), unit(10).content());
    }

    #[test]
    fn test_empty_unit_has_no_chunks() {
        let empty = TextUnit::new(
            "   ".to_string(),
            SourceMetadata::new("advisory.pdf", OriginType::Document, 7),
        );
        assert!(chunker(500, 25).split_unit(0, &empty).unwrap().is_empty());
    }

    #[test]
    fn test_chunk_count_lower_bound() {
        let chunker = chunker(500, 25);
        for words in [1usize, 474, 475, 476, 500, 950, 1000, 1234] {
            let chunks = chunker.split_unit(0, &unit(words)).unwrap();
            let expected = words.div_ceil(475);
            assert!(
                chunks.len() >= expected,
                "{} tokens gave {} chunks",
                words,
                chunks.len()
            );
            assert!(chunks.iter().all(|c| {
                let (start, end) = c.token_span();
                end - start <= 500
            }));
        }
    }

    #[test]
    fn test_adjacent_chunks_share_overlap() {
        let chunks = chunker(10, 3).split_unit(0, &unit(25)).unwrap();

        for pair in chunks.windows(2) {
            let previous = tokens(pair[0].text());
            let next = tokens(pair[1].text());
            let shared = 3.min(next.len());
            assert_eq!(previous[previous.len() - 3..][..shared], next[..shared]);
        }
    }

    #[test]
    fn test_non_overlapping_parts_rebuild_unit() {
        let chunker = chunker(7, 2);
        for words in [1usize, 5, 7, 8, 20, 33] {
            let source = unit(words);
            let chunks = chunker.split_unit(3, &source).unwrap();

            let mut rebuilt: Vec<String> = Vec::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let chunk_tokens = tokens(chunk.text());
                let skip = if i == 0 { 0 } else { 2.min(chunk_tokens.len()) };
                rebuilt.extend(chunk_tokens.into_iter().skip(skip));
            }

            assert_eq!(rebuilt, tokens(source.content()), "{} tokens", words);
        }
    }

    #[test]
    fn test_chunks_are_contiguous_slices() {
        let source = TextUnit::new(
            "Mahindi  hupandwa\nmwanzoni mwa mvua za masika".to_string(),
            SourceMetadata::new("Cereals", OriginType::Tabular, 2),
        );
        let chunks = chunker(3, 1).split_unit(0, &source).unwrap();

        assert_eq!(chunks[0].text(), "Mahindi  hupandwa\nmwanzoni");
        for chunk in &chunks {
            assert!(source.content().contains(chunk.text()));
            assert_eq!(chunk.metadata().source_id(), "Cereals");
        }
    }

    #[test]
    fn test_deterministic() {
        let units = vec![unit(40), unit(3), unit(17)];
        let chunker = chunker(8, 2);
        assert_eq!(
            chunker.split_units(&units).unwrap(),
            chunker.split_units(&units).unwrap()
        );
    }

    #[test]
    fn test_chunk_indices_follow_units() {
        let units = vec![unit(12), unit(4)];
        let chunks = chunker(8, 2).split_units(&units).unwrap();

        let positions: Vec<(usize, usize)> = chunks
            .iter()
            .map(|c| (c.unit_index(), c.chunk_index()))
            .collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (1, 0)]);
    }
}
