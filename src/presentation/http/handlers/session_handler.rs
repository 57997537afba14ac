use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::errors::AdvisoryError;
use crate::application::use_cases::{
    AnswerQuestionRequest, AnswerQuestionUseCase, GetHistoryUseCase, SelectRegionRequest,
    SelectRegionUseCase, StartSessionUseCase,
};
use crate::presentation::http::dto::{
    AnswerDto, ApiResponse, HistoryDto, MessageRequestDto, RegionOutlookDto,
    SelectRegionRequestDto, SessionCreatedDto,
};
use crate::presentation::http::errors::error_response;

pub struct SessionHandler {
    start_session_use_case: Arc<StartSessionUseCase>,
    select_region_use_case: Arc<SelectRegionUseCase>,
    answer_question_use_case: Arc<AnswerQuestionUseCase>,
    get_history_use_case: Arc<GetHistoryUseCase>,
}

impl SessionHandler {
    pub fn new(
        start_session_use_case: Arc<StartSessionUseCase>,
        select_region_use_case: Arc<SelectRegionUseCase>,
        answer_question_use_case: Arc<AnswerQuestionUseCase>,
        get_history_use_case: Arc<GetHistoryUseCase>,
    ) -> Self {
        Self {
            start_session_use_case,
            select_region_use_case,
            answer_question_use_case,
            get_history_use_case,
        }
    }

    pub async fn start_session(State(handler): State<Arc<SessionHandler>>) -> impl IntoResponse {
        match handler.start_session_use_case.execute().await {
            Ok(response) => (
                StatusCode::CREATED,
                Json(ApiResponse::success(SessionCreatedDto::from(response))),
            ),
            Err(e) => error_response(e),
        }
    }

    pub async fn select_region(
        State(handler): State<Arc<SessionHandler>>,
        Path(session_id): Path<Uuid>,
        Json(request): Json<SelectRegionRequestDto>,
    ) -> impl IntoResponse {
        let region = request.region.trim();
        if region.is_empty() {
            return error_response(AdvisoryError::InvalidInput(
                "region cannot be empty".to_string(),
            ));
        }

        let request = SelectRegionRequest {
            session_id,
            region: region.to_string(),
        };

        match handler.select_region_use_case.execute(request).await {
            Ok(outlook) => (
                StatusCode::OK,
                Json(ApiResponse::success(RegionOutlookDto::from(outlook))),
            ),
            Err(e) => error_response(e),
        }
    }

    pub async fn post_message(
        State(handler): State<Arc<SessionHandler>>,
        Path(session_id): Path<Uuid>,
        Json(request): Json<MessageRequestDto>,
    ) -> impl IntoResponse {
        let request = AnswerQuestionRequest {
            session_id,
            text: request.text,
        };

        match handler.answer_question_use_case.execute(request).await {
            Ok(response) => (
                StatusCode::OK,
                Json(ApiResponse::success(AnswerDto::from(response))),
            ),
            Err(e) => error_response(e),
        }
    }

    pub async fn get_history(
        State(handler): State<Arc<SessionHandler>>,
        Path(session_id): Path<Uuid>,
    ) -> impl IntoResponse {
        match handler.get_history_use_case.execute(session_id).await {
            Ok(history) => (
                StatusCode::OK,
                Json(ApiResponse::success(HistoryDto::from(history))),
            ),
            Err(e) => error_response(e),
        }
    }
}
