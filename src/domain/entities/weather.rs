use serde::{Deserialize, Serialize};

/// Longest forecast window the aggregator accepts, in days.
pub const FORECAST_WINDOW_DAYS: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Place name as reported by the geocoder.
    pub resolved_name: Option<String>,
    pub country: Option<String>,
}

/// Per-day forecast series. `None` for a whole series means the provider did
/// not return that field at all; `None` inside a series is a missing day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub dates: Vec<String>,
    pub temperature_max: Option<Vec<Option<f64>>>,
    pub temperature_min: Option<Vec<Option<f64>>>,
    pub precipitation_sum: Option<Vec<Option<f64>>>,
    pub wind_speed_max: Option<Vec<Option<f64>>>,
}

/// Aggregate of one forecast fetch. Superseded wholesale by the next fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub avg_temperature: f64,
    pub avg_precipitation: f64,
    /// 1-based forecast days where either temperature bound is missing.
    pub missing_day_indices: Vec<usize>,
    pub avg_wind_speed: Option<f64>,
    pub days: usize,
}

impl WeatherSummary {
    pub fn is_complete(&self) -> bool {
        self.missing_day_indices.is_empty()
    }
}
