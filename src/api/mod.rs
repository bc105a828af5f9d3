//! HTTP layer: route handlers and router composition.

pub mod handlers;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::ApiError;

/// Builds the complete router with middleware and state attached.
///
/// Unmatched paths fall through to Axum's default `404 Not Found`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::system::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the HTTP listener.
///
/// # Errors
///
/// Returns [`ApiError::Io`] if the address cannot be bound.
pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, ApiError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "server listening");
    Ok(listener)
}
