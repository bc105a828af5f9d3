//! # qr-feedback-api
//!
//! Bootstrap HTTP API for the QR Feedback service.
//!
//! At startup the binary loads its configuration from the environment,
//! reads a Google service-account key, builds one Firestore client handle
//! and serves a single health-check route with permissive CORS.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── CORS + Trace layers
//!     ├── Index handler (api/)
//!     │
//!     ├── AppState
//!     │     └── FirestoreClient (firestore/)
//!     │           └── TokenSource ── ServiceAccountKey (credentials/)
//!     │
//!     └── Cloud Firestore / Google OAuth2
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod credentials;
pub mod error;
pub mod firestore;
