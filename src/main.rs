//! qr-feedback-api server entry point.
//!
//! Loads configuration and the Firebase service-account key, builds the
//! Firestore client handle and serves the HTTP API until shutdown.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use qr_feedback_api::api;
use qr_feedback_api::app_state::AppState;
use qr_feedback_api::config::{ApiConfig, LogFormat};
use qr_feedback_api::credentials::ServiceAccountKey;
use qr_feedback_api::firestore::FirestoreClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ApiConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config);
    tracing::info!(addr = %config.listen_addr(), debug = config.debug, "starting qr-feedback-api");

    // Credential + database handle
    let key = ServiceAccountKey::from_file(&config.firebase_key_path)
        .inspect_err(|e| tracing::error!(error = %e, "failed to load service-account key"))?;
    let db = FirestoreClient::new(&key, config.firestore_database.clone())?;
    tracing::info!(
        project = %db.project_id(),
        database = %db.database_id(),
        "firestore client initialized"
    );

    // Build router
    let app = api::build_router(AppState::new(db));

    // Start server
    let listener = api::bind_listener(config.listen_addr())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to bind listener"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_level()));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::warn!("received Ctrl-C, shutting down"),
        () = terminate => tracing::warn!("received SIGTERM, shutting down"),
    }
}
