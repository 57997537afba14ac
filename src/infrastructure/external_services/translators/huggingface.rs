use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::translator::{Translator, TranslatorError};
use crate::domain::value_objects::Language;

pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "Helsinki-NLP/opus-mt-sw-en";

#[derive(Debug, Clone)]
pub struct HuggingFaceTranslatorConfig {
    pub api_token: Option<String>,
    pub model: String,
    pub base_url: String,
    pub source: Language,
    pub target: Language,
    pub timeout_secs: u64,
}

/// A single-direction translation model served by the Hugging Face
/// inference API.
pub struct HuggingFaceTranslator {
    config: HuggingFaceTranslatorConfig,
    client: Client,
    name: String,
}

impl HuggingFaceTranslator {
    pub fn new(config: HuggingFaceTranslatorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let name = format!("huggingface:{}", config.model);
        Ok(Self {
            config,
            client,
            name,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslationOutput {
    translation_text: String,
}

#[async_trait]
impl Translator for HuggingFaceTranslator {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslatorError> {
        if from != self.config.source || to != self.config.target {
            return Err(TranslatorError::UnsupportedDirection { from, to });
        }

        let mut request = self
            .client
            .post(self.endpoint())
            .json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranslatorError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::ApiError { status, body });
        }

        let outputs: Vec<TranslationOutput> = response
            .json()
            .await
            .map_err(|e| TranslatorError::InvalidResponse(e.to_string()))?;

        outputs
            .into_iter()
            .next()
            .map(|output| output.translation_text)
            .ok_or_else(|| TranslatorError::InvalidResponse("empty translation list".to_string()))
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
