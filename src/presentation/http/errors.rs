use axum::{Json, http::StatusCode};

use crate::application::errors::AdvisoryError;
use crate::presentation::http::dto::ApiResponse;

pub fn status_for(error: &AdvisoryError) -> StatusCode {
    match error {
        AdvisoryError::SessionNotFound(_) | AdvisoryError::LocationNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        AdvisoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AdvisoryError::RegionNotSelected => StatusCode::CONFLICT,
        AdvisoryError::IncompleteWeatherData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisoryError::IndexNotBuilt | AdvisoryError::NotInitialized => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AdvisoryError::WeatherFetch(_)
        | AdvisoryError::Translation(_)
        | AdvisoryError::ModelInvocation(_)
        | AdvisoryError::Embedding(_) => StatusCode::BAD_GATEWAY,
        AdvisoryError::Load(_)
        | AdvisoryError::IndexDeserialization(_)
        | AdvisoryError::IndexPersistence(_)
        | AdvisoryError::Chunking(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns an application failure into the API's error envelope.
pub fn error_response<T>(error: AdvisoryError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::warn!("Request rejected: {}", error);
    }

    (
        status,
        Json(ApiResponse::error(
            error.code().to_string(),
            error.to_string(),
            None,
        )),
    )
}
