use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{LlmClientConfig, build_client, read_error};
use crate::application::ports::language_model::{LanguageModel, LanguageModelError};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Any chat-completions endpoint speaking the OpenAI wire format.
pub struct OpenAiCompatibleLanguageModel {
    config: LlmClientConfig,
    client: Client,
}

impl OpenAiCompatibleLanguageModel {
    pub fn new(config: LlmClientConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, LanguageModelError> {
        let mut headers = HeaderMap::new();
        if !self.config.api_key.trim().is_empty() {
            let auth = format!("Bearer {}", self.config.api_key.trim());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth).map_err(|_| {
                    LanguageModelError::InvalidResponse("invalid API key".to_string())
                })?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleLanguageModel {
    async fn invoke(&self, prompt: &str) -> Result<String, LanguageModelError> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
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

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LanguageModelError::InvalidResponse("no choices returned".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
