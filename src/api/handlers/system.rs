//! System endpoints: the index health check.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::{Json, Router};
use serde::Serialize;

use crate::app_state::AppState;

/// Message returned by the index route.
pub const HEALTH_MESSAGE: &str = "QR Feedback Flask API is running!";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Static status message.
    pub message: &'static str,
}

/// `/` — Service health check. Method, query and body are ignored.
pub async fn index_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            message: HEALTH_MESSAGE,
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", any(index_handler))
}
