pub mod cohere;
pub mod openai_compatible;

pub use cohere::CohereLanguageModel;
pub use openai_compatible::OpenAiCompatibleLanguageModel;

use std::time::Duration;

use reqwest::Client;

use crate::application::ports::language_model::LanguageModelError;

#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

pub(crate) fn build_client(config: &LlmClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}

pub(crate) async fn read_error(response: reqwest::Response) -> LanguageModelError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    LanguageModelError::ApiError { status, body }
}
