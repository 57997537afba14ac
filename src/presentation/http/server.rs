use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::infrastructure::container::StartupError;
use crate::presentation::http::{
    handlers::SessionHandler,
    routes::{health_routes, session_routes},
};

pub const DEFAULT_PORT: u16 = 3000;

pub struct HttpServer {
    session_handler: Arc<SessionHandler>,
    port: u16,
}

impl HttpServer {
    pub fn new(session_handler: Arc<SessionHandler>, port: Option<u16>) -> Self {
        Self {
            session_handler,
            port: port.unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health_routes())
            .merge(session_routes(self.session_handler.clone()))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1MB cap
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), StartupError> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| StartupError::Server(format!("cannot bind {}: {}", addr, e)))?;
        tracing::info!("Listening on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| StartupError::Server(e.to_string()))
    }
}
