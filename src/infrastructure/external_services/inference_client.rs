use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
    EmbeddingRequest, EmbeddingResponse,
};

#[derive(Serialize)]
pub struct EmbeddingsRequest {
    pub text: TextInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Deserialize)]
pub struct EmbeddingsResponse {
    pub success: bool,
    pub embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingsClientConfig {
    pub service_url: String,
    pub model_name: String,
    pub dimension: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

impl Default for EmbeddingsClientConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080/embed".to_string(),
            model_name: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            max_retries: 3,
            timeout_secs: 30,
            backoff_factor: 1.5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingsError {
    #[error("request failed: {0}")]
    RequestError(String),
    #[error("service returned {0}")]
    Status(StatusCode),
    #[error("response could not be parsed: {0}")]
    ParseError(String),
    #[error("giving up after {0} attempts")]
    MaxRetriesExceeded(u32),
}

impl EmbeddingsError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingsError::RequestError(_) => true,
            EmbeddingsError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    config: EmbeddingsClientConfig,
}

impl InferenceClient {
    pub fn new(config: EmbeddingsClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EmbeddingsClientConfig {
        &self.config
    }

    pub async fn get_embedding(&self, text: &str) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let request = EmbeddingsRequest {
            text: TextInput::Single(text.to_string()),
            model: Some(self.config.model_name.clone()),
        };

        self.send_request(request).await
    }

    pub async fn get_embeddings(&self, texts: &[String]) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let request = EmbeddingsRequest {
            text: TextInput::Multiple(texts.to_vec()),
            model: Some(self.config.model_name.clone()),
        };

        self.send_request(request).await
    }

    async fn send_request(
        &self,
        request: EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempts > self.config.max_retries {
                        tracing::error!("Embedding request failed after {} attempts: {}", attempts, e);
                        return Err(EmbeddingsError::MaxRetriesExceeded(attempts));
                    }

                    let backoff_time = Duration::from_millis(
                        (self.config.backoff_factor.powi(attempts as i32 - 1) * 1000.0) as u64,
                    );
                    tracing::warn!(
                        "Embedding request attempt {} failed ({}), retrying in {:?}",
                        attempts,
                        e,
                        backoff_time
                    );

                    tokio::time::sleep(backoff_time).await;
                }
            }
        }
    }

    async fn execute_request(
        &self,
        request: &EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let response = self
            .client
            .post(&self.config.service_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| EmbeddingsError::RequestError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(EmbeddingsError::Status(response.status()));
        }

        let data = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingsError::ParseError(e.to_string()))?;

        if !data.success {
            return Err(EmbeddingsError::ParseError(
                "service reported success = false".to_string(),
            ));
        }

        Ok(data)
    }
}

fn provider_error(error: EmbeddingsError) -> EmbeddingProviderError {
    match error {
        EmbeddingsError::RequestError(msg) => EmbeddingProviderError::NetworkError(msg),
        EmbeddingsError::Status(StatusCode::TOO_MANY_REQUESTS) => {
            EmbeddingProviderError::RateLimitExceeded
        }
        EmbeddingsError::Status(status) if status.is_client_error() => {
            EmbeddingProviderError::InvalidInput(format!("service returned {}", status))
        }
        EmbeddingsError::Status(status) => {
            EmbeddingProviderError::ApiError(format!("service returned {}", status))
        }
        EmbeddingsError::ParseError(msg) => EmbeddingProviderError::ApiError(msg),
        EmbeddingsError::MaxRetriesExceeded(_) => EmbeddingProviderError::ServiceUnavailable,
    }
}

// Adapter to implement the EmbeddingProvider trait
pub struct InferenceEmbeddingProvider {
    client: InferenceClient,
}

impl InferenceEmbeddingProvider {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), EmbeddingProviderError> {
        if embedding.len() != self.client.config().dimension {
            return Err(EmbeddingProviderError::ApiError(format!(
                "expected {}-dimensional embeddings, got {}",
                self.client.config().dimension,
                embedding.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for InferenceEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        let response = self
            .client
            .get_embedding(&request.text)
            .await
            .map_err(provider_error)?;

        let embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            EmbeddingProviderError::ApiError("No embeddings returned".to_string())
        })?;
        self.check_dimension(&embedding)?;

        Ok(EmbeddingResponse { embedding })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if request.texts.is_empty() {
            return Ok(BatchEmbeddingResponse {
                embeddings: Vec::new(),
            });
        }

        let response = self
            .client
            .get_embeddings(&request.texts)
            .await
            .map_err(provider_error)?;

        for embedding in &response.embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(BatchEmbeddingResponse {
            embeddings: response.embeddings,
        })
    }

    fn model_info(&self) -> (String, Option<String>) {
        (self.client.config().model_name.clone(), None)
    }
}
