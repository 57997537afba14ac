use std::sync::Arc;

use crate::application::errors::AdvisoryError;
use crate::application::ports::{ForecastProvider, Geocoder};
use crate::domain::entities::{Coordinates, DailyForecast, FORECAST_WINDOW_DAYS, WeatherSummary};

/// A resolved region with its reduced forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOutlook {
    pub region: String,
    pub coordinates: Coordinates,
    pub summary: WeatherSummary,
}

pub struct WeatherService {
    geocoder: Arc<dyn Geocoder>,
    forecast_provider: Arc<dyn ForecastProvider>,
    forecast_days: usize,
}

impl WeatherService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast_provider: Arc<dyn ForecastProvider>,
        forecast_days: usize,
    ) -> Self {
        Self {
            geocoder,
            forecast_provider,
            forecast_days: forecast_days.clamp(1, FORECAST_WINDOW_DAYS),
        }
    }

    pub async fn resolve(&self, region_name: &str) -> Result<Coordinates, AdvisoryError> {
        let region_name = region_name.trim();
        if region_name.is_empty() {
            return Err(AdvisoryError::InvalidInput(
                "region name cannot be empty".to_string(),
            ));
        }

        let coordinates = self.geocoder.resolve(region_name).await?;
        tracing::info!(
            "Resolved {} to ({}, {})",
            region_name,
            coordinates.latitude,
            coordinates.longitude
        );

        Ok(coordinates)
    }

    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<DailyForecast, AdvisoryError> {
        let forecast = self
            .forecast_provider
            .fetch_daily(latitude, longitude, self.forecast_days)
            .await?;
        tracing::info!(
            "Fetched {}-day forecast for ({}, {})",
            forecast.dates.len(),
            latitude,
            longitude
        );

        Ok(forecast)
    }

    pub async fn region_outlook(&self, region_name: &str) -> Result<RegionOutlook, AdvisoryError> {
        let coordinates = self.resolve(region_name).await?;
        let forecast = self.fetch(coordinates.latitude, coordinates.longitude).await?;
        let summary = summarize(&forecast)?;

        if !summary.is_complete() {
            tracing::warn!(
                "Forecast for {} is missing temperatures on days {:?}",
                region_name,
                summary.missing_day_indices
            );
        }

        Ok(RegionOutlook {
            region: region_name.trim().to_string(),
            coordinates,
            summary,
        })
    }
}

fn required<'a>(
    series: &'a Option<Vec<Option<f64>>>,
    name: &str,
) -> Result<&'a [Option<f64>], AdvisoryError> {
    match series {
        Some(values) if !values.is_empty() => Ok(values),
        _ => Err(AdvisoryError::IncompleteWeatherData(format!(
            "{} series is empty or absent",
            name
        ))),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Reduces a daily forecast to averages over the forecast window.
///
/// Temperature is the mean of `(max + min) / 2` over days where both bounds
/// are present; days missing either bound are reported 1-based in
/// `missing_day_indices`. Precipitation treats missing days as zero and is
/// averaged over the whole window.
pub fn summarize(daily: &DailyForecast) -> Result<WeatherSummary, AdvisoryError> {
    let maxima = required(&daily.temperature_max, "temperature_max")?;
    let minima = required(&daily.temperature_min, "temperature_min")?;
    let precipitation = required(&daily.precipitation_sum, "precipitation_sum")?;

    let window = maxima
        .len()
        .max(minima.len())
        .max(precipitation.len())
        .min(FORECAST_WINDOW_DAYS);

    let mut missing_day_indices = Vec::new();
    let mut day_means = Vec::with_capacity(window);
    for day in 0..window {
        let high = maxima.get(day).copied().flatten();
        let low = minima.get(day).copied().flatten();
        match (high, low) {
            (Some(high), Some(low)) => day_means.push((high + low) / 2.0),
            _ => missing_day_indices.push(day + 1),
        }
    }

    let avg_temperature = mean(day_means.into_iter()).ok_or_else(|| {
        AdvisoryError::IncompleteWeatherData("no day has both temperature bounds".to_string())
    })?;

    let total_precipitation: f64 = precipitation
        .iter()
        .take(window)
        .map(|value| value.unwrap_or(0.0))
        .sum();

    let avg_wind_speed = daily
        .wind_speed_max
        .as_deref()
        .and_then(|winds| mean(winds.iter().take(window).flatten().copied()));

    Ok(WeatherSummary {
        avg_temperature,
        avg_precipitation: total_precipitation / window as f64,
        missing_day_indices,
        avg_wind_speed,
        days: window,
    })
}
