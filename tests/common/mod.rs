//! Shared helpers for integration tests.

#![allow(dead_code, clippy::expect_used)]

use std::path::PathBuf;

use axum::Router;
use qr_feedback_api::api::build_router;
use qr_feedback_api::app_state::AppState;
use qr_feedback_api::credentials::ServiceAccountKey;
use qr_feedback_api::firestore::FirestoreClient;

/// Path to the fixture service-account key.
pub fn fixture_key_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/service_account.json")
}

/// Application state backed by the fixture credential.
pub fn test_state() -> AppState {
    let key = ServiceAccountKey::from_file(fixture_key_path()).expect("fixture key loads");
    let db = FirestoreClient::new(&key, "(default)").expect("client builds");
    AppState::new(db)
}

/// Fully layered router, as served by the binary.
pub fn test_router() -> Router {
    build_router(test_state())
}
