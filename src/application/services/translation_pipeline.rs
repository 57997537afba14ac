use std::sync::Arc;

use crate::application::errors::AdvisoryError;
use crate::application::ports::Translator;
use crate::domain::value_objects::Language;

// Common Swahili function words and farming vocabulary. Kept sorted.
const SWAHILI_MARKERS: &[&str] = &[
    "asante", "bora", "cha", "eneo", "gani", "habari", "hakuna", "hali", "hewa", "hii", "hiyo",
    "huu", "je", "kama", "katika", "kulima", "kuna", "kupanda", "kwa", "la", "lakini", "langu",
    "lini", "maharagwe", "mahindi", "mazao", "mbegu", "mbolea", "mimi", "msimu", "mvua", "na",
    "nataka", "naweza", "ni", "ninaweza", "nini", "pia", "sana", "shamba", "sisi", "tafadhali",
    "udongo", "unaweza", "vipi", "vya", "wa", "wangu", "wapi", "wewe", "ya", "yangu", "za",
    "zaidi",
];

const SWAHILI_RATIO: f64 = 0.25;

/// Lexical detector deciding between the pivot language and Swahili.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn detect(&self, text: &str) -> Language {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphabetic() && c != '\'')
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return Language::PIVOT;
        }

        let markers = words
            .iter()
            .filter(|word| SWAHILI_MARKERS.binary_search(&word.as_str()).is_ok())
            .count();
        if markers as f64 / words.len() as f64 >= SWAHILI_RATIO {
            Language::Swahili
        } else {
            Language::English
        }
    }
}

/// Text in the pivot language with a record of where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotText {
    pub text: String,
    pub source_language: Language,
    pub translated: bool,
}

/// Wraps a turn in inbound and outbound translation. The two directions
/// use different providers.
pub struct TranslationPipeline {
    inbound: Arc<dyn Translator>,
    outbound: Arc<dyn Translator>,
    detector: LanguageDetector,
}

impl TranslationPipeline {
    pub fn new(inbound: Arc<dyn Translator>, outbound: Arc<dyn Translator>) -> Self {
        Self {
            inbound,
            outbound,
            detector: LanguageDetector,
        }
    }

    pub fn detect(&self, text: &str) -> Language {
        self.detector.detect(text)
    }

    pub async fn to_pivot(&self, text: &str) -> Result<PivotText, AdvisoryError> {
        self.to_pivot_from(text, self.detect(text)).await
    }

    pub async fn to_pivot_from(
        &self,
        text: &str,
        source_language: Language,
    ) -> Result<PivotText, AdvisoryError> {
        if source_language.is_pivot() {
            tracing::debug!("Input already in {}, skipping inbound translation", Language::PIVOT);
            return Ok(PivotText {
                text: text.to_string(),
                source_language,
                translated: false,
            });
        }

        let translated = self
            .inbound
            .translate(text, source_language, Language::PIVOT)
            .await?;
        tracing::info!(
            "Translated inbound text {} -> {} via {}",
            source_language,
            Language::PIVOT,
            self.inbound.provider_name()
        );

        Ok(PivotText {
            text: translated,
            source_language,
            translated: true,
        })
    }

    pub async fn from_pivot(&self, text: &str, target: Language) -> Result<String, AdvisoryError> {
        if target.is_pivot() {
            return Ok(text.to_string());
        }

        let translated = self.outbound.translate(text, Language::PIVOT, target).await?;
        tracing::info!(
            "Translated outbound text {} -> {} via {}",
            Language::PIVOT,
            target,
            self.outbound.provider_name()
        );

        Ok(translated)
    }
}
