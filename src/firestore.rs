//! Cloud Firestore client handle.
//!
//! [`FirestoreClient`] is created once at startup from a
//! [`ServiceAccountKey`] and shared through [`crate::app_state::AppState`].
//! Construction does no network I/O; OAuth2 tokens are fetched lazily by
//! [`TokenSource`] the first time a caller needs one.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credentials::ServiceAccountKey;
use crate::error::ApiError;

/// Firestore REST API root.
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// OAuth2 scopes requested for the service account.
pub const FIRESTORE_SCOPES: &str =
    "https://www.googleapis.com/auth/datastore https://www.googleapis.com/auth/cloud-platform";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for signed assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Claims of the self-signed assertion exchanged for an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer (service-account email).
    pub iss: String,
    /// Subject (service-account email).
    pub sub: String,
    /// Audience (token endpoint).
    pub aud: String,
    /// Space-separated OAuth2 scopes.
    pub scope: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug)]
struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }
}

/// Service-account OAuth2 token source using the JWT-bearer grant.
///
/// The current token is cached behind a mutex; concurrent callers wait on
/// a single refresh instead of each hitting the token endpoint.
pub struct TokenSource {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    signing_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("client_email", &self.client_email)
            .field("key_id", &self.key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Creates a token source for the given key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Firestore`] if the private key cannot be parsed.
    pub fn new(key: &ServiceAccountKey, http: reqwest::Client) -> Result<Self, ApiError> {
        let signing_key = key
            .encoding_key()
            .map_err(|e| ApiError::Firestore(format!("invalid signing key: {e}")))?;
        Ok(Self {
            client_email: key.client_email.clone(),
            key_id: key.private_key_id.clone(),
            token_uri: key.token_uri.clone(),
            signing_key,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Builds the assertion claims for a token request issued at `now`.
    #[must_use]
    pub fn claims(&self, now: DateTime<Utc>) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            sub: self.client_email.clone(),
            aud: self.token_uri.clone(),
            scope: FIRESTORE_SCOPES.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        }
    }

    /// Signs an RS256 assertion for a token request issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Firestore`] if signing fails.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, ApiError> {
        let header = Header {
            kid: self.key_id.clone(),
            ..Header::new(Algorithm::RS256)
        };
        jsonwebtoken::encode(&header, &self.claims(now), &self.signing_key)
            .map_err(|e| ApiError::Firestore(format!("failed to sign assertion: {e}")))
    }

    /// Returns a valid bearer token, refreshing it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Firestore`] if the token endpoint is unreachable,
    /// answers with a non-success status, or returns a malformed body.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh(Utc::now())
        {
            return Ok(token.value.expose_secret().clone());
        }

        let token = self.fetch().await?;
        let value = token.value.expose_secret().clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch(&self) -> Result<AccessToken, ApiError> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        tracing::debug!(token_uri = %self.token_uri, "requesting access token");
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<TokenErrorResponse>(&text) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {desc}", err.error),
                    None => err.error,
                },
                Err(_) => text,
            };
            tracing::warn!(%status, %reason, "token endpoint rejected assertion");
            return Err(ApiError::Firestore(format!(
                "token endpoint returned {status}: {reason}"
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Firestore(format!("malformed token response: {e}")))?;
        let lifetime = parsed.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                ApiError::Firestore(format!(
                    "malformed token response: expires_in {lifetime} out of range"
                ))
            })?;

        Ok(AccessToken {
            value: SecretString::new(parsed.access_token),
            expires_at,
        })
    }
}

/// Credential-backed handle to a Cloud Firestore database.
#[derive(Debug)]
pub struct FirestoreClient {
    project_id: String,
    database_id: String,
    base_url: String,
    http: reqwest::Client,
    tokens: TokenSource,
}

impl FirestoreClient {
    /// Builds the client handle. Performs no network I/O.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Firestore`] if the HTTP client cannot be built or
    /// the key's private key cannot be used for signing.
    pub fn new(key: &ServiceAccountKey, database_id: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let tokens = TokenSource::new(key, http.clone())?;
        Ok(Self {
            project_id: key.project_id.clone(),
            database_id: database_id.into(),
            base_url: FIRESTORE_BASE_URL.to_string(),
            http,
            tokens,
        })
    }

    /// Google Cloud project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Firestore database id.
    #[must_use]
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// REST API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared HTTP client.
    #[must_use]
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `projects/{project}/databases/{database}`.
    #[must_use]
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.project_id, self.database_id
        )
    }

    /// `projects/{project}/databases/{database}/documents`.
    #[must_use]
    pub fn documents_path(&self) -> String {
        format!("{}/documents", self.database_path())
    }

    /// Returns a valid bearer token for Firestore requests.
    ///
    /// # Errors
    ///
    /// See [`TokenSource::access_token`].
    pub async fn access_token(&self) -> Result<String, ApiError> {
        self.tokens.access_token().await
    }
}
