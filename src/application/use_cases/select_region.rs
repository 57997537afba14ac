use std::sync::Arc;

use uuid::Uuid;

use crate::application::errors::AdvisoryError;
use crate::application::ports::{LanguageModel, SessionStore};
use crate::application::services::{RagChain, RegionOutlook, Retriever, WeatherService};

#[derive(Debug, Clone)]
pub struct SelectRegionRequest {
    pub session_id: Uuid,
    pub region: String,
}

pub struct SelectRegionUseCase {
    retriever: Arc<Retriever>,
    weather_service: Arc<WeatherService>,
    llm: Arc<dyn LanguageModel>,
    sessions: Arc<dyn SessionStore>,
}

impl SelectRegionUseCase {
    pub fn new(
        retriever: Arc<Retriever>,
        weather_service: Arc<WeatherService>,
        llm: Arc<dyn LanguageModel>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            retriever,
            weather_service,
            llm,
            sessions,
        }
    }

    /// Fetches the region's forecast and rebuilds the session's chain around
    /// it. On failure the session keeps whatever region it had before.
    pub async fn execute(&self, request: SelectRegionRequest) -> Result<RegionOutlook, AdvisoryError> {
        let session = self
            .sessions
            .get(request.session_id)
            .await
            .ok_or(AdvisoryError::SessionNotFound(request.session_id))?;

        let outlook = self.weather_service.region_outlook(&request.region).await?;

        let chain = Arc::new(RagChain::new(
            self.retriever.clone(),
            self.llm.clone(),
            outlook.region.clone(),
            outlook.summary.clone(),
        ));
        session.lock().await.select_region(chain);

        tracing::info!(
            "Session {} selected {} (avg {:.2}°C, {:.2} mm)",
            request.session_id,
            outlook.region,
            outlook.summary.avg_temperature,
            outlook.summary.avg_precipitation
        );

        Ok(outlook)
    }
}
