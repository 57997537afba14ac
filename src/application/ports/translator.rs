use async_trait::async_trait;

use crate::domain::value_objects::Language;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslatorError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Translation API returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Unexpected translation response: {0}")]
    InvalidResponse(String),
    #[error("Unsupported direction {from} -> {to}")]
    UnsupportedDirection { from: Language, to: Language },
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslatorError>;

    fn provider_name(&self) -> &str;
}
