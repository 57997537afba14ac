use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::{IndexOrigin, RegionOutlook};
use crate::application::use_cases::{AnswerQuestionResponse, SessionHistory, StartSessionResponse};
use crate::domain::entities::{ConversationTurn, Role};

#[derive(Debug, Serialize)]
pub struct SessionCreatedDto {
    pub session_id: Uuid,
    pub message: String,
    pub indexed_entries: usize,
    pub index_origin: String,
}

impl From<StartSessionResponse> for SessionCreatedDto {
    fn from(response: StartSessionResponse) -> Self {
        Self {
            session_id: response.session_id,
            message: response.message,
            indexed_entries: response.stats.indexed_entries,
            index_origin: match response.stats.origin {
                IndexOrigin::Loaded => "loaded".to_string(),
                IndexOrigin::Built => "built".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectRegionRequestDto {
    pub region: String,
}

#[derive(Debug, Serialize)]
pub struct RegionOutlookDto {
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub resolved_name: Option<String>,
    pub country: Option<String>,
    pub avg_temperature: f64,
    pub avg_precipitation: f64,
    pub avg_wind_speed: Option<f64>,
    pub missing_day_indices: Vec<usize>,
    pub forecast_days: usize,
}

impl From<RegionOutlook> for RegionOutlookDto {
    fn from(outlook: RegionOutlook) -> Self {
        Self {
            region: outlook.region,
            latitude: outlook.coordinates.latitude,
            longitude: outlook.coordinates.longitude,
            resolved_name: outlook.coordinates.resolved_name,
            country: outlook.coordinates.country,
            avg_temperature: outlook.summary.avg_temperature,
            avg_precipitation: outlook.summary.avg_precipitation,
            avg_wind_speed: outlook.summary.avg_wind_speed,
            missing_day_indices: outlook.summary.missing_day_indices,
            forecast_days: outlook.summary.days,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageRequestDto {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerDto {
    pub reply: String,
    pub detected_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_query: Option<String>,
}

impl From<AnswerQuestionResponse> for AnswerDto {
    fn from(response: AnswerQuestionResponse) -> Self {
        Self {
            reply: response.reply,
            detected_language: response.detected_language.code().to_string(),
            translated_query: response.translated_query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TurnDto {
    pub role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ConversationTurn> for TurnDto {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: match turn.role() {
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            text: turn.text().to_string(),
            created_at: turn.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryDto {
    pub session_id: Uuid,
    pub region: Option<String>,
    pub started_at: DateTime<Utc>,
    pub turns: Vec<TurnDto>,
}

impl From<SessionHistory> for HistoryDto {
    fn from(history: SessionHistory) -> Self {
        Self {
            session_id: history.session_id,
            region: history.region,
            started_at: history.started_at,
            turns: history.turns.iter().map(TurnDto::from).collect(),
        }
    }
}
