//! Google service-account credential loading.
//!
//! The credential file is the JSON key downloaded from the Firebase console.
//! It is read once at startup; a missing file, a non-service-account key or
//! an unparsable private key aborts startup.

use std::path::Path;

use jsonwebtoken::EncodingKey;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ApiError;

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Parsed service-account key.
///
/// The private key is kept in a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    /// Credential type, always `service_account` once validated.
    #[serde(rename = "type", default)]
    pub key_type: String,
    /// Google Cloud project that owns the Firestore database.
    #[serde(default)]
    pub project_id: String,
    /// Key id, sent as the `kid` header of signed assertions.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// PEM-encoded RSA private key.
    pub private_key: SecretString,
    /// Service-account email, the issuer of signed assertions.
    #[serde(default)]
    pub client_email: String,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Reads and validates a key file.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Credentials`] if the file cannot be read, is not
    /// valid JSON, or fails [`ServiceAccountKey::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ApiError::credentials(path, e))?;
        Self::from_json(&raw).map_err(|reason| ApiError::credentials(path, reason))
    }

    /// Parses and validates a key from its JSON text.
    fn from_json(raw: &str) -> Result<Self, String> {
        let key: Self = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        key.validate()?;
        Ok(key)
    }

    /// Checks the fields the token exchange depends on.
    fn validate(&self) -> Result<(), String> {
        if self.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(format!(
                "expected type {SERVICE_ACCOUNT_TYPE:?}, found {:?}",
                self.key_type
            ));
        }
        for (field, value) in [
            ("project_id", &self.project_id),
            ("client_email", &self.client_email),
            ("token_uri", &self.token_uri),
        ] {
            if value.trim().is_empty() {
                return Err(format!("field {field} is missing or empty"));
            }
        }
        self.encoding_key()
            .map(|_| ())
            .map_err(|e| format!("private_key is not a valid RSA key: {e}"))
    }

    /// Builds the RS256 signing key from the PEM private key.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error if the PEM cannot be parsed.
    pub fn encoding_key(&self) -> Result<EncodingKey, jsonwebtoken::errors::Error> {
        EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
    }
}
