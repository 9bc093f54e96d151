use std::sync::Mutex;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::error::SheetsError;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for each assertion; Google caps it at one hour.
const ASSERTION_TTL_SECS: i64 = 3600;
/// Refresh this long before the reported expiry.
const EXPIRY_SLACK_SECS: i64 = 60;

/// The fields of a service-account key file this client needs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, SheetsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
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
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Exchanges signed service-account assertions for OAuth access tokens and
/// caches the token until shortly before it expires.
pub struct TokenSource {
    key: ServiceAccountKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            cached: Mutex::new(None),
        }
    }

    /// Sign the JWT assertion sent to the token endpoint.
    pub fn sign_assertion(&self, now: i64) -> Result<String, SheetsError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: self.key.token_uri(),
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| SheetsError::Token(format!("invalid private key: {e}")))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| SheetsError::Token(e.to_string()))
    }

    /// A bearer token valid for at least [`EXPIRY_SLACK_SECS`] more seconds.
    pub fn access_token(&self, agent: &ureq::Agent) -> Result<String, SheetsError> {
        let now = jiff::Timestamp::now().as_second();

        let mut cached = self
            .cached
            .lock()
            .map_err(|_| SheetsError::Token("token cache lock poisoned".to_string()))?;
        if let Some(token) = cached.as_ref()
            && token.expires_at - EXPIRY_SLACK_SECS > now
        {
            return Ok(token.access_token.clone());
        }

        let assertion = self.sign_assertion(now)?;
        tracing::debug!(client_email = %self.key.client_email, "requesting access token");

        let mut response = agent
            .post(self.key.token_uri())
            .send_form([("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .map_err(|e| SheetsError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.body_mut().read_to_string().unwrap_or_default();
            return Err(SheetsError::Token(format!("token endpoint returned {status}: {message}")));
        }

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| SheetsError::Token(e.to_string()))?;

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });
        Ok(token.access_token)
    }
}
