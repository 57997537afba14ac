use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::translator::{Translator, TranslatorError};
use crate::domain::value_objects::Language;

pub const DEFAULT_TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Clone)]
pub struct GoogleTranslatorConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Google Cloud Translation (v2 REST).
pub struct GoogleTranslator {
    config: GoogleTranslatorConfig,
    client: Client,
}

impl GoogleTranslator {
    pub fn new(config: GoogleTranslatorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslatorError> {
        let body = TranslateRequest {
            q: text,
            source: from.code(),
            target: to.code(),
            format: "text",
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslatorError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::ApiError { status, body });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslatorError::InvalidResponse(e.to_string()))?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| TranslatorError::InvalidResponse("no translations returned".to_string()))
    }

    fn provider_name(&self) -> &str {
        "google"
    }
}
