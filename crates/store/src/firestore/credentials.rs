//! Service-account credentials and token exchange

use std::path::{Path, PathBuf};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// OAuth scope granting Firestore read/write
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The subset of a Google service-account key file that is used
///
/// `private_key` and `client_email` are only needed against the production
/// endpoint; emulator runs only need `project_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Project the key belongs to
    pub project_id: String,
    /// Service account identity, the JWT issuer
    #[serde(default)]
    pub client_email: Option<String>,
    /// PEM-encoded RSA key
    #[serde(default)]
    pub private_key: Option<String>,
    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    /// Load a key file
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::Credentials {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut key = Self::from_json(&raw).map_err(|e| match e {
            StoreError::Credentials { message, .. } => StoreError::Credentials {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        key.source = Some(path.to_path_buf());
        Ok(key)
    }

    /// Parse key file contents
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(raw).map_err(|e| StoreError::Credentials {
                path: PathBuf::new(),
                message: e.to_string(),
            })?;
        if key.project_id.trim().is_empty() {
            return Err(StoreError::Credentials {
                path: PathBuf::new(),
                message: "project_id is empty".to_string(),
            });
        }
        Ok(key)
    }

    fn require<'a>(&self, field: &'a str, value: &'a Option<String>) -> StoreResult<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StoreError::Credentials {
                path: self.source.clone().unwrap_or_default(),
                message: format!("{} is required for production access", field),
            })
    }

    /// Build the signed JWT assertion sent to the token endpoint
    pub fn signed_assertion(&self) -> StoreResult<String> {
        let client_email = self.require("client_email", &self.client_email)?;
        let private_key = self.require("private_key", &self.private_key)?;

        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {}", e)))?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {}", e)))
    }

    /// Exchange the signed assertion for an OAuth access token
    pub fn fetch_access_token(&self, agent: &ureq::Agent) -> StoreResult<String> {
        let assertion = self.signed_assertion()?;
        debug!("Requesting access token from {}", self.token_uri);

        let response = agent
            .post(&self.token_uri)
            .send_form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .map_err(|e| match StoreError::from_ureq("token exchange", e) {
                StoreError::Http { status, body, .. } => {
                    StoreError::Auth(format!("token endpoint returned {}: {}", status, body))
                }
                other => other,
            })?;
        let token: TokenResponse = response
            .into_json()
            .map_err(|e| StoreError::decode("token exchange", e.to_string()))?;
        Ok(token.access_token)
    }
}
