use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::{self, AuthConfig};

pub mod keys;

use keys::KeyStore;

/// Authorization failure, carrying the HTTP status and machine code the
/// error envelope exposes.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is expected")]
    MissingHeader,

    #[error("authorization header must be a bearer token")]
    MalformedHeader,

    #[error("authorization token must carry a key id")]
    MissingKeyId,

    #[error("unable to find an appropriate signing key")]
    UnknownKey,

    #[error("unable to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("unable to parse authentication token")]
    InvalidToken,

    #[error("incorrect claims, check the audience and issuer")]
    InvalidClaims,

    #[error("token is expired")]
    TokenExpired,

    #[error("permission not found: {0}")]
    PermissionDenied(String),
}

impl AuthError {
    /// 401 for token/identity problems, 403 for explicit permission absence.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::PermissionDenied(_) => 403,
            _ => 401,
        }
    }

    /// Machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader
            | AuthError::MissingKeyId
            | AuthError::UnknownKey
            | AuthError::KeyFetch(_)
            | AuthError::InvalidToken => "invalid_header",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::TokenExpired => "token_expired",
            AuthError::PermissionDenied(_) => "unauthorized",
        }
    }

    pub fn description(&self) -> String {
        self.to_string()
    }
}

/// Decoded token payload. Request-scoped; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    /// Permission strings granted by the identity provider. An absent
    /// claim deserializes as empty, which denies everything.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Claims {
    pub fn require_permission(&self, permission: &str) -> Result<(), AuthError> {
        if self.permissions.iter().any(|p| p == permission) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied(permission.to_string()))
        }
    }
}

/// Validates bearer tokens against the identity provider's published key
/// set and checks permission claims.
pub struct Authenticator {
    keys: KeyStore,
    validation: Validation,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&config.audience]);
        validation.set_issuer(&[config.issuer()]);

        Self {
            keys: KeyStore::new(
                config.jwks_url(),
                Duration::from_secs(config.jwks_cache_ttl_secs),
            ),
            validation,
        }
    }

    /// Decode and verify a bearer token: signature against the key set,
    /// then issuer, audience and expiry.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.keys.decoding_key(&kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidAudience
            | jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
            _ => AuthError::InvalidToken,
        })?;

        Ok(data.claims)
    }

    /// Pure request gate: extract the bearer token, verify it, and check
    /// that the required permission is present. Short-circuits before any
    /// data-store access on failure.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let token = extract_bearer(headers)?;
        let claims = self.verify(&token).await?;
        claims.require_permission(permission)?;
        Ok(claims)
    }
}

static AUTHENTICATOR: Lazy<Authenticator> = Lazy::new(|| Authenticator::new(&config::config().auth));

/// Authorize an incoming request against the process-wide authenticator.
pub async fn authorize(headers: &HeaderMap, permission: &str) -> Result<Claims, AuthError> {
    AUTHENTICATOR.authorize(headers, permission).await
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let token = value.strip_prefix("Bearer ").ok_or(AuthError::MalformedHeader)?;
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token.to_string())
}
