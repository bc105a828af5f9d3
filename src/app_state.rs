//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::firestore::FirestoreClient;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Firestore handle, created once at startup.
    pub db: Arc<FirestoreClient>,
}

impl AppState {
    /// Wraps an already-constructed Firestore client.
    #[must_use]
    pub fn new(db: FirestoreClient) -> Self {
        Self { db: Arc::new(db) }
    }
}
