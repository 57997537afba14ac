use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::presentation::http::handlers::SessionHandler;

pub fn session_routes(handler: Arc<SessionHandler>) -> Router {
    Router::new()
        .route("/sessions", post(SessionHandler::start_session))
        .route("/sessions/{id}/region", put(SessionHandler::select_region))
        .route("/sessions/{id}/messages", post(SessionHandler::post_message))
        .route("/sessions/{id}/history", get(SessionHandler::get_history))
        .with_state(handler)
}
