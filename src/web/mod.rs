//! HTTP surface over the failure catalog.
//!
//! Every handler takes the single catalog lock for the duration of its
//! operation, so toggles and the state-file write are serialized.

pub mod handlers;
pub mod page;
pub mod state;

use crate::core::TrackerError;
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;

pub use state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Tracker(TrackerError),
    Input(String),
    Task(JoinError),
}

impl From<TrackerError> for WebError {
    fn from(err: TrackerError) -> Self {
        WebError::Tracker(err)
    }
}

impl From<JoinError> for WebError {
    fn from(err: JoinError) -> Self {
        WebError::Task(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Tracker(err @ TrackerError::Write { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "persistence_error",
            ),
            WebError::Tracker(TrackerError::Config(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg, "config_error")
            }
            WebError::Tracker(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "internal_error",
            ),
            WebError::Input(msg) => (StatusCode::BAD_REQUEST, msg, "input_error"),
            WebError::Task(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "internal_error",
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::healthcheck))
        .route("/api/errors", get(handlers::list_errors))
        .route("/api/toggle/*identity", post(handlers::toggle_error))
        .route("/api/stats", get(handlers::get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
