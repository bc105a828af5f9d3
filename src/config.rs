//! Service configuration loaded from environment variables.
//!
//! All settings come from the environment (or a `.env` file via `dotenvy`).
//! Only `FIREBASE_KEY_PATH` is required; everything else has a default.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ApiError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Firestore database id used when `FIRESTORE_DATABASE` is not set.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`ApiConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Path to the Google service-account JSON file.
    pub firebase_key_path: PathBuf,

    /// Interface to bind the HTTP server to.
    pub host: IpAddr,

    /// TCP port to bind the HTTP server to.
    pub port: u16,

    /// Raises the default log level to `debug`.
    pub debug: bool,

    /// Log output format.
    pub log_format: LogFormat,

    /// Firestore database id.
    pub firestore_database: String,
}

impl ApiConfig {
    /// Loads configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv().ok()` first so a `.env` file in the working
    /// directory is honored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingEnv`] if `FIREBASE_KEY_PATH` is absent or
    /// empty, and [`ApiError::InvalidEnv`] if `PORT` or `HOST` is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ApiConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let firebase_key_path = lookup("FIREBASE_KEY_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ApiError::MissingEnv("FIREBASE_KEY_PATH"))?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ApiError::InvalidEnv {
                key: "PORT",
                reason: format!("{raw:?}: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let host = match lookup("HOST") {
            Some(raw) => raw.trim().parse().map_err(|e| ApiError::InvalidEnv {
                key: "HOST",
                reason: format!("{raw:?}: {e}"),
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let debug = parse_bool(lookup("DEBUG").as_deref(), false);

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let firestore_database = lookup("FIRESTORE_DATABASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Ok(Self {
            firebase_key_path,
            host,
            port,
            debug,
            log_format,
            firestore_database,
        })
    }

    /// Socket address the HTTP server binds to.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Default `tracing` filter directive when `RUST_LOG` is not set.
    #[must_use]
    pub const fn default_log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

/// Parses a boolean flag. Accepts `"true"`, `"1"`, `"false"`, `"0"`
/// (case-insensitive). Returns `default` otherwise.
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}
