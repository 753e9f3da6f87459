//! Backend token generation
//!
//! The call-control API authenticates with short-lived application JWTs
//! signed with the application's RSA private key (RS256). `TokenProvider` is
//! the seam the transfer action uses; `ApplicationTokenProvider` is the real
//! implementation and `StaticTokenProvider` substitutes a fixed token in
//! tests and local development.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use super::error::TokenError;

/// Default validity window for generated tokens.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(300);

/// Supplies auth tokens for the call-control API.
pub trait TokenProvider: Send + Sync {
    /// Generate a token valid for backend call-control requests.
    fn backend_token(&self) -> Result<String, TokenError>;
}

/// Claims carried by an application JWT.
#[derive(Debug, Serialize)]
struct ApplicationClaims {
    application_id: String,
    iat: u64,
    exp: u64,
    jti: String,
}

/// Generates RS256 application JWTs from the configured private key.
pub struct ApplicationTokenProvider {
    application_id: String,
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl ApplicationTokenProvider {
    /// Build a provider from PEM-encoded RSA private key material.
    pub fn from_pem(application_id: impl Into<String>, pem: &[u8]) -> Result<Self, TokenError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(pem).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self {
            application_id: application_id.into(),
            encoding_key,
            ttl: DEFAULT_TOKEN_TTL,
        })
    }

    /// Build a provider from a private key file on disk.
    pub fn from_key_file(
        application_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, TokenError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|source| TokenError::KeyRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_pem(application_id, &pem)
    }
}

impl TokenProvider for ApplicationTokenProvider {
    fn backend_token(&self) -> Result<String, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TokenError::Encoding(e.to_string()))?
            .as_secs();

        let claims = ApplicationClaims {
            application_id: self.application_id.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
            jti: Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

/// Returns a fixed token. For tests and local development against mocks.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn backend_token(&self) -> Result<String, TokenError> {
        Ok(self.token.clone())
    }
}
