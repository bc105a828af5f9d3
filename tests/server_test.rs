//! End-to-end tests over a real TCP listener.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::path::PathBuf;

use qr_feedback_api::config::ApiConfig;
use qr_feedback_api::credentials::ServiceAccountKey;
use qr_feedback_api::error::ApiError;
use tokio::net::TcpListener;

use common::{fixture_key_path, test_router};

#[tokio::test]
async fn serves_index_over_http() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, test_router()).await;
    });

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .header("Origin", "https://qr-feedback-backend.web.app")
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "QR Feedback Flask API is running!");
}

#[tokio::test]
async fn configured_port_is_bound() {
    // Grab a free port, release it, then bind through the config.
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);

    let key_path = fixture_key_path();
    let port_str = port.to_string();
    let config = ApiConfig::from_lookup(|key| match key {
        "FIREBASE_KEY_PATH" => Some(key_path.display().to_string()),
        "HOST" => Some("127.0.0.1".to_string()),
        "PORT" => Some(port_str.clone()),
        _ => None,
    })
    .unwrap();

    let listener = TcpListener::bind(config.listen_addr()).await.unwrap();
    assert_eq!(listener.local_addr().unwrap().port(), port);
}

#[test]
fn startup_fails_without_key_path() {
    let err = ApiConfig::from_lookup(|key| match key {
        "PORT" => Some("5000".to_string()),
        _ => None,
    })
    .unwrap_err();
    assert!(matches!(err, ApiError::MissingEnv("FIREBASE_KEY_PATH")));
}

#[test]
fn startup_fails_with_missing_key_file() {
    let config = ApiConfig::from_lookup(|key| match key {
        "FIREBASE_KEY_PATH" => Some("/does/not/exist.json".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.firebase_key_path, PathBuf::from("/does/not/exist.json"));

    let err = ServiceAccountKey::from_file(&config.firebase_key_path).unwrap_err();
    assert!(matches!(err, ApiError::Credentials { .. }));
}
