use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LanguageModelError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Model API returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Unexpected model response: {0}")]
    InvalidResponse(String),
}

/// A text-in, text-out completion service.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, LanguageModelError>;

    fn model_name(&self) -> &str;
}
