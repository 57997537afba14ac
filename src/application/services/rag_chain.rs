use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};

use crate::application::errors::AdvisoryError;
use crate::application::ports::LanguageModel;
use crate::application::services::retriever::Retriever;
use crate::domain::entities::{Chunk, WeatherSummary};

/// Phrase the model is told to close every answer with. Compliance is left
/// to the model.
pub const SIGN_OFF: &str = "thanks for asking!";

pub fn format_docs(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(Chunk::text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Region- and weather-aware question answering over the retriever.
pub struct RagChain {
    retriever: Arc<Retriever>,
    llm: Arc<dyn LanguageModel>,
    region: String,
    weather: WeatherSummary,
}

impl RagChain {
    pub fn new(
        retriever: Arc<Retriever>,
        llm: Arc<dyn LanguageModel>,
        region: impl Into<String>,
        weather: WeatherSummary,
    ) -> Self {
        Self {
            retriever,
            llm,
            region: region.into(),
            weather,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    #[cfg(test)]
    pub fn weather(&self) -> &WeatherSummary {
        &self.weather
    }

    pub async fn answer(&self, question: &str) -> Result<String, AdvisoryError> {
        self.answer_on(question, Local::now().date_naive()).await
    }

    pub async fn answer_on(&self, question: &str, today: NaiveDate) -> Result<String, AdvisoryError> {
        let docs = self.retriever.get_docs(question).await?;
        let prompt = self.prompt_for(question, &format_docs(&docs), today);

        let started = Instant::now();
        let output = self.llm.invoke(&prompt).await?;
        tracing::info!(
            "{} answered in {:?} using {} context chunks",
            self.llm.model_name(),
            started.elapsed(),
            docs.len()
        );

        Ok(output)
    }

    pub fn prompt_for(&self, question: &str, context: &str, today: NaiveDate) -> String {
        format!(
            "You are an expert large language model in Agriculture in Kenya.
Your task is to give agricultural advisory to farmers based on their location, location weather forecast, and the crop they enquire about.

If the crop is not suitable for the user's location, suggest another crop.

If the crop is not suitable for the current or forecasted weather, suggest another crop and give constructive agricultural advice.

Always say \"{sign_off}\" at the end of the answer.

You are to use the following pieces of context to answer the user's question.

Question from user: {question}

Context: {context}

The user's location is: {region}

The average weather forecast for the user's location for the next 16 days is: Average Temperature: {temperature:.2}°C , Average Precipitation: {precipitation:.2} mm

The current date is: {month} {day}
",
            sign_off = SIGN_OFF,
            question = question,
            context = context,
            region = self.region,
            temperature = self.weather.avg_temperature,
            precipitation = self.weather.avg_precipitation,
            month = today.format("%B"),
            day = today.format("%d"),
        )
    }
}
