use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{LlmClientConfig, build_client, read_error};
use crate::application::ports::language_model::{LanguageModel, LanguageModelError};

pub const DEFAULT_COHERE_URL: &str = "https://api.cohere.ai/v1";

/// Cohere chat endpoint, sent the whole prompt as a single user message.
pub struct CohereLanguageModel {
    config: LlmClientConfig,
    client: Client,
}

impl CohereLanguageModel {
    pub fn new(config: LlmClientConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat", self.config.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, LanguageModelError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| LanguageModelError::InvalidResponse("invalid Cohere API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl LanguageModel for CohereLanguageModel {
    async fn invoke(&self, prompt: &str) -> Result<String, LanguageModelError> {
        let body = ChatRequest {
            message: prompt,
            model: &self.config.model,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| LanguageModelError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LanguageModelError::InvalidResponse(e.to_string()))?;

        Ok(parsed.text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    model: &'a str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    text: String,
}
