use async_trait::async_trait;

use crate::domain::entities::{Coordinates, DailyForecast};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeatherProviderError {
    #[error("No location matches '{0}'")]
    LocationNotFound(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Weather service returned status {0}")]
    BadStatus(u16),
    #[error("Unexpected weather response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, region_name: &str) -> Result<Coordinates, WeatherProviderError>;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> Result<DailyForecast, WeatherProviderError>;
}
