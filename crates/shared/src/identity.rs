//! Identity assertion verification.
//!
//! An identity assertion (a Google ID token in production, any non-empty
//! string in local development) is exchanged for a [`VerifiedIdentity`].
//! Sessions are then issued by [`crate::jwt::JwtService`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::error::AppError;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity established by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Stable subject id from the provider.
    pub subject: String,
    /// Email address.
    pub email: String,
    /// Display name, if the provider shared one.
    pub name: Option<String>,
    /// Avatar URL, if the provider shared one.
    pub picture: Option<String>,
}

/// Errors raised while verifying an identity assertion.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No token was supplied.
    #[error("identity token is required")]
    MissingToken,

    /// The provider rejected the token or it fails our checks.
    #[error("identity token rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered garbage.
    #[error("identity provider unavailable: {0}")]
    Provider(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MissingToken | IdentityError::Rejected(_) => {
                Self::Unauthorized(err.to_string())
            }
            IdentityError::Provider(_) => Self::ExternalService(err.to_string()),
        }
    }
}

/// Verifies identity assertions.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies `token` and returns the identity it asserts.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Fields of Google's `tokeninfo` response that we read.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    iss: String,
    aud: String,
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl TokenInfo {
    fn into_identity(self, client_id: &str) -> Result<VerifiedIdentity, IdentityError> {
        if self.aud != client_id {
            return Err(IdentityError::Rejected("audience mismatch".into()));
        }
        if !GOOGLE_ISSUERS.contains(&self.iss.as_str()) {
            return Err(IdentityError::Rejected(format!("unexpected issuer {}", self.iss)));
        }
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| IdentityError::Rejected("token carries no email".into()))?;
        if self.sub.is_empty() {
            return Err(IdentityError::Rejected("token carries no subject".into()));
        }

        Ok(VerifiedIdentity {
            subject: self.sub,
            email,
            name: self.name.filter(|n| !n.is_empty()),
            picture: self.picture.filter(|p| !p.is_empty()),
        })
    }
}

/// Verifies Google ID tokens against Google's `tokeninfo` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleIdentityVerifier {
    http: reqwest::Client,
    client_id: String,
    endpoint: String,
}

impl GoogleIdentityVerifier {
    /// Creates a verifier accepting tokens issued for `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Provider` if the HTTP client cannot be built.
    pub fn new(client_id: impl Into<String>) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        Ok(Self {
            http,
            client_id: client_id.into(),
            endpoint: GOOGLE_TOKENINFO_URL.to_string(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(IdentityError::Rejected(format!("provider answered {status}")));
        }
        if !status.is_success() {
            return Err(IdentityError::Provider(format!("provider answered {status}")));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        info.into_identity(&self.client_id)
    }
}

/// Insecure verifier for local development.
///
/// Trusts any non-empty token and derives a stable identity from it, so
/// `alice` always signs in as `alice@local.dev`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevIdentityVerifier;

#[async_trait]
impl IdentityVerifier for DevIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }

        Ok(VerifiedIdentity {
            subject: format!("local-{token}"),
            email: format!("{token}@local.dev"),
            name: Some("Local User".to_string()),
            picture: None,
        })
    }
}
