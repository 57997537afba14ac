#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenizerError {
    #[error("Tokenizer could not be loaded: {0}")]
    LoadFailed(String),
    #[error("Tokenization failed: {0}")]
    EncodeFailed(String),
}

/// Splits text into tokens and reports where each token sits in the input.
///
/// Offsets are byte ranges into the input string, non-overlapping and in
/// ascending order, so any run of consecutive tokens maps back onto a
/// contiguous slice of the original text.
pub trait Tokenizer: Send + Sync {
    fn token_offsets(&self, text: &str) -> Result<Vec<(usize, usize)>, TokenizerError>;

    fn name(&self) -> &str;
}
