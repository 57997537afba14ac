use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::application::ports::LoadOptions;
use crate::application::services::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::application::services::{IndexConfig, KnowledgeBaseSources, MAX_TOP_K, RETRIEVAL_TOP_K};
use crate::domain::entities::{DistanceMetric, FORECAST_WINDOW_DAYS};
use crate::infrastructure::external_services::inference_client::EmbeddingsClientConfig;
use crate::infrastructure::external_services::language_models::LlmClientConfig;
use crate::infrastructure::external_services::language_models::cohere::DEFAULT_COHERE_URL;
use crate::infrastructure::external_services::language_models::openai_compatible::DEFAULT_OPENAI_URL;
use crate::infrastructure::external_services::open_meteo::{
    DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL, OpenMeteoConfig,
};
use crate::infrastructure::external_services::translators::google::{
    DEFAULT_TRANSLATE_URL, GoogleTranslatorConfig,
};
use crate::infrastructure::external_services::translators::huggingface::{
    DEFAULT_INFERENCE_URL, DEFAULT_MODEL, HuggingFaceTranslatorConfig,
};
use crate::infrastructure::session::in_memory_session_store::{DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS};
use crate::domain::value_objects::Language;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct KnowledgeBaseConfig {
    pub sources: KnowledgeBaseSources,
    pub index_path: PathBuf,
    pub allow_dangerous_deserialization: bool,
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub tokenizer_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Cohere,
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub client: LlmClientConfig,
}

#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub inbound: HuggingFaceTranslatorConfig,
    pub outbound: GoogleTranslatorConfig,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub client: OpenMeteoConfig,
    pub forecast_days: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_sessions: usize,
    pub idle_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub knowledge_base: KnowledgeBaseConfig,
    pub chunking: ChunkingConfig,
    pub index: IndexConfig,
    pub retrieval_top_k: usize,
    pub embeddings: EmbeddingsClientConfig,
    pub llm: LlmConfig,
    pub translation: TranslationConfig,
    pub weather: WeatherConfig,
    pub server: ServerConfig,
    pub sessions: SessionConfig,
}

struct Env<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.string(key).ok_or(ConfigError::Missing { key })
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.string(key) {
            None => Ok(default),
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    key,
                    value,
                    reason: "expected true or false".to_string(),
                }),
            },
        }
    }

    fn url(&self, key: &'static str, default: &str) -> Result<String, ConfigError> {
        let value = self.string_or(key, default);
        Url::parse(&value).map_err(|e| ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        })?;
        Ok(value)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let knowledge_base = KnowledgeBaseConfig {
            sources: KnowledgeBaseSources {
                workbook_path: PathBuf::from(env.string_or(
                    "KB_WORKBOOK_PATH",
                    "Data/Weather Agro Advisory Knowledge Base.xlsx",
                )),
                document_path: PathBuf::from(
                    env.string_or("KB_DOCUMENT_PATH", "Data/Agro Advisory.pdf"),
                ),
            },
            index_path: PathBuf::from(env.string_or("INDEX_PATH", "faiss_index")),
            allow_dangerous_deserialization: env.flag("ALLOW_DANGEROUS_DESERIALIZATION", true)?,
        };

        let chunking = ChunkingConfig {
            chunk_size: env.parse("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: env.parse("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            tokenizer_path: env.string("TOKENIZER_PATH").map(PathBuf::from),
        };
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(ConfigError::Invalid {
                key: "CHUNK_OVERLAP",
                value: chunking.chunk_overlap.to_string(),
                reason: format!("must be smaller than CHUNK_SIZE ({})", chunking.chunk_size),
            });
        }

        let dimension: usize = env.parse("EMBEDDING_DIMENSION", 384)?;
        if dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "EMBEDDING_DIMENSION",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let index = IndexConfig {
            dimension,
            metric: DistanceMetric::L2,
            max_top_k: MAX_TOP_K,
            batch_size: env.parse("EMBEDDING_BATCH_SIZE", 32usize)?.max(1),
            embedding_concurrency: env.parse("EMBEDDING_CONCURRENCY", 4usize)?.max(1),
            load_options: LoadOptions {
                allow_dangerous_deserialization: knowledge_base.allow_dangerous_deserialization,
            },
        };
        let retrieval_top_k = env.parse("RETRIEVAL_TOP_K", RETRIEVAL_TOP_K)?.clamp(1, MAX_TOP_K);

        let embedding_defaults = EmbeddingsClientConfig::default();
        let embeddings = EmbeddingsClientConfig {
            service_url: env.url("EMBEDDINGS_SERVICE_URL", &embedding_defaults.service_url)?,
            model_name: env.string_or("EMBEDDINGS_MODEL", &embedding_defaults.model_name),
            dimension,
            ..embedding_defaults
        };

        let provider = match env.string_or("LLM_PROVIDER", "cohere").to_lowercase().as_str() {
            "cohere" => LlmProvider::Cohere,
            "openai" => LlmProvider::OpenAi,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LLM_PROVIDER",
                    value: other.to_string(),
                    reason: "expected cohere or openai".to_string(),
                });
            }
        };
        let (default_url, default_model) = match provider {
            LlmProvider::Cohere => (DEFAULT_COHERE_URL, "command-r"),
            LlmProvider::OpenAi => (DEFAULT_OPENAI_URL, "gpt-4o-mini"),
        };
        let llm = LlmConfig {
            provider,
            client: LlmClientConfig {
                api_key: match provider {
                    LlmProvider::Cohere => env.required("LLM_API_KEY")?,
                    LlmProvider::OpenAi => env.string_or("LLM_API_KEY", ""),
                },
                model: env.string_or("LLM_MODEL", default_model),
                base_url: env.url("LLM_BASE_URL", default_url)?,
                temperature: env.parse("LLM_TEMPERATURE", 0.0f32)?,
                timeout_secs: env.parse("LLM_TIMEOUT_SECS", 120u64)?,
            },
        };

        let translation_timeout = env.parse("TRANSLATION_TIMEOUT_SECS", 60u64)?;
        let translation = TranslationConfig {
            inbound: HuggingFaceTranslatorConfig {
                api_token: env.string("HF_API_TOKEN"),
                model: env.string_or("INBOUND_TRANSLATION_MODEL", DEFAULT_MODEL),
                base_url: env.url("INBOUND_TRANSLATION_URL", DEFAULT_INFERENCE_URL)?,
                source: Language::Swahili,
                target: Language::PIVOT,
                timeout_secs: translation_timeout,
            },
            outbound: GoogleTranslatorConfig {
                api_key: env.string_or("GOOGLE_TRANSLATE_API_KEY", ""),
                base_url: env.url("OUTBOUND_TRANSLATION_URL", DEFAULT_TRANSLATE_URL)?,
                timeout_secs: translation_timeout,
            },
        };

        let weather = WeatherConfig {
            client: OpenMeteoConfig {
                forecast_url: env.url("FORECAST_URL", DEFAULT_FORECAST_URL)?,
                geocoding_url: env.url("GEOCODING_URL", DEFAULT_GEOCODING_URL)?,
                timeout_secs: env.parse("WEATHER_TIMEOUT_SECS", 15u64)?,
            },
            forecast_days: env
                .parse("FORECAST_DAYS", FORECAST_WINDOW_DAYS)?
                .clamp(1, FORECAST_WINDOW_DAYS),
        };

        let server = ServerConfig {
            port: env.parse("PORT", 3000u16)?,
        };

        let sessions = SessionConfig {
            max_sessions: env.parse("MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?.max(1),
            idle_ttl_secs: env.parse("SESSION_IDLE_TTL_SECS", DEFAULT_IDLE_TTL.as_secs())?,
        };

        Ok(Self {
            knowledge_base,
            chunking,
            index,
            retrieval_top_k,
            embeddings,
            llm,
            translation,
            weather,
            server,
            sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("LLM_API_KEY", "secret")]).unwrap();

        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 25);
        assert_eq!(config.index.dimension, 384);
        assert_eq!(config.retrieval_top_k, 15);
        assert_eq!(config.knowledge_base.index_path, PathBuf::from("faiss_index"));
        assert!(config.index.load_options.allow_dangerous_deserialization);
        assert_eq!(config.weather.forecast_days, 16);
        assert_eq!(config.llm.provider, LlmProvider::Cohere);
        assert_eq!(config.llm.client.temperature, 0.0);
        assert_eq!(config.translation.inbound.model, "Helsinki-NLP/opus-mt-sw-en");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.sessions.max_sessions, 1000);
        assert_eq!(config.sessions.idle_ttl_secs, 3600);
    }

    #[test]
    fn test_cohere_needs_api_key() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::Missing { key: "LLM_API_KEY" }
        );
    }

    #[test]
    fn test_openai_provider_without_key() {
        let config = config_from(&[
            ("LLM_PROVIDER", "openai"),
            ("LLM_BASE_URL", "http://localhost:11434/v1"),
        ])
        .unwrap();

        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.client.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_opt_out_flows_to_load_options() {
        let config = config_from(&[
            ("LLM_API_KEY", "secret"),
            ("ALLOW_DANGEROUS_DESERIALIZATION", "FALSE"),
        ])
        .unwrap();

        assert!(!config.index.load_options.allow_dangerous_deserialization);
    }

    #[test]
    fn test_limits_are_capped() {
        let config = config_from(&[
            ("LLM_API_KEY", "secret"),
            ("RETRIEVAL_TOP_K", "40"),
            ("FORECAST_DAYS", "30"),
            ("MAX_SESSIONS", "0"),
        ])
        .unwrap();

        assert_eq!(config.retrieval_top_k, 15);
        assert_eq!(config.weather.forecast_days, 16);
        assert_eq!(config.sessions.max_sessions, 1);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("LLM_API_KEY", "k"), ("CHUNK_SIZE", "lots")]),
            Err(ConfigError::Invalid { key: "CHUNK_SIZE", .. })
        ));
        assert!(matches!(
            config_from(&[("LLM_API_KEY", "k"), ("CHUNK_OVERLAP", "500")]),
            Err(ConfigError::Invalid { key: "CHUNK_OVERLAP", .. })
        ));
        assert!(matches!(
            config_from(&[("LLM_API_KEY", "k"), ("FORECAST_URL", "not a url")]),
            Err(ConfigError::Invalid { key: "FORECAST_URL", .. })
        ));
        assert!(matches!(
            config_from(&[("LLM_API_KEY", "k"), ("ALLOW_DANGEROUS_DESERIALIZATION", "maybe")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config_from(&[("LLM_API_KEY", "k"), ("LLM_PROVIDER", "palm")]),
            Err(ConfigError::Invalid { key: "LLM_PROVIDER", .. })
        ));
    }
}
