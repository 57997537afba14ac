use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::weather_provider::{ForecastProvider, Geocoder, WeatherProviderError};
use crate::domain::entities::{Coordinates, DailyForecast, FORECAST_WINDOW_DAYS};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,wind_speed_10m_max";

#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    pub forecast_url: String,
    pub geocoding_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

/// Open-Meteo geocoding and daily forecast client.
pub struct OpenMeteoClient {
    client: Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(WeatherProviderError::BadStatus(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherProviderError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    temperature_2m_max: Option<Vec<Option<f64>>>,
    temperature_2m_min: Option<Vec<Option<f64>>>,
    precipitation_sum: Option<Vec<Option<f64>>>,
    wind_speed_10m_max: Option<Vec<Option<f64>>>,
}

impl From<DailyBlock> for DailyForecast {
    fn from(daily: DailyBlock) -> Self {
        DailyForecast {
            dates: daily.time,
            temperature_max: daily.temperature_2m_max,
            temperature_min: daily.temperature_2m_min,
            precipitation_sum: daily.precipitation_sum,
            wind_speed_max: daily.wind_speed_10m_max,
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn resolve(&self, region_name: &str) -> Result<Coordinates, WeatherProviderError> {
        let response: GeocodingResponse = self
            .get_json(
                &self.config.geocoding_url,
                &[
                    ("name", region_name.to_string()),
                    ("count", "1".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        response
            .results
            .into_iter()
            .next()
            .map(|result| Coordinates {
                latitude: result.latitude,
                longitude: result.longitude,
                resolved_name: Some(result.name),
                country: result.country,
            })
            .ok_or_else(|| WeatherProviderError::LocationNotFound(region_name.to_string()))
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> Result<DailyForecast, WeatherProviderError> {
        let response: ForecastResponse = self
            .get_json(
                &self.config.forecast_url,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("forecast_days", days.clamp(1, FORECAST_WINDOW_DAYS).to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        Ok(response.daily.into())
    }
}
