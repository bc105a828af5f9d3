//! Service error types.
//!
//! [`ApiError`] covers everything that can go wrong while bootstrapping the
//! service: configuration, credential loading, and talking to Firestore.
//! The index route itself is infallible, so these errors surface at startup
//! and terminate the process before the listener binds.

use std::path::PathBuf;

/// Central error enum for the service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required environment variable is missing or empty.
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    /// An environment variable is set but holds an unusable value.
    #[error("invalid value for {key}: {reason}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The service-account credential could not be loaded.
    #[error("invalid credential file {}: {reason}", path.display())]
    Credentials {
        /// Path the credential was read from.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Token exchange or Firestore request failure.
    #[error("firestore error: {0}")]
    Firestore(String),

    /// I/O failure outside credential loading, such as binding the listener.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Shorthand for building an [`ApiError::Credentials`].
    pub(crate) fn credentials(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Credentials {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Firestore(err.to_string())
    }
}
