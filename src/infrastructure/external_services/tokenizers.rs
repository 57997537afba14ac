use std::path::Path;

use crate::application::ports::tokenizer::{Tokenizer, TokenizerError};

/// Treats every maximal run of non-whitespace as one token.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn token_offsets(&self, text: &str) -> Result<Vec<(usize, usize)>, TokenizerError> {
        let mut offsets = Vec::new();
        let mut start = None;

        for (index, ch) in text.char_indices() {
            match (ch.is_whitespace(), start) {
                (true, Some(begin)) => {
                    offsets.push((begin, index));
                    start = None;
                }
                (false, None) => start = Some(index),
                _ => {}
            }
        }
        if let Some(begin) = start {
            offsets.push((begin, text.len()));
        }

        Ok(offsets)
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

/// A pretrained tokenizer loaded from a `tokenizer.json`.
pub struct HuggingFaceTokenizer {
    inner: tokenizers::Tokenizer,
    name: String,
}

impl HuggingFaceTokenizer {
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| TokenizerError::LoadFailed(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Loaded tokenizer from {}", path.display());

        Ok(Self {
            inner,
            name: path.display().to_string(),
        })
    }
}

impl Tokenizer for HuggingFaceTokenizer {
    fn token_offsets(&self, text: &str) -> Result<Vec<(usize, usize)>, TokenizerError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizerError::EncodeFailed(e.to_string()))?;

        // Zero-width offsets belong to special or padding tokens.
        Ok(encoding
            .get_offsets()
            .iter()
            .copied()
            .filter(|(start, end)| end > start)
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
