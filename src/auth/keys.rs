use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::AuthError;

/// Cached signing-key set fetched from the identity provider's well-known
/// JWKS endpoint.
///
/// Keys are matched by `kid`. A lookup miss inside the freshness window
/// forces one refetch so freshly rotated keys are honored; a kid that is
/// still absent after the refetch is rejected.
pub struct KeyStore {
    jwks_url: String,
    ttl: Duration,
    client: reqwest::Client,
    cached: RwLock<Option<CachedKeys>>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl KeyStore {
    pub fn new(jwks_url: String, ttl: Duration) -> Self {
        Self {
            jwks_url,
            ttl,
            client: reqwest::Client::new(),
            cached: RwLock::new(None),
        }
    }

    /// Resolve the decoding key for a token's `kid`.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(jwk) = self.cached_find(kid).await {
            return key_from_jwk(&jwk);
        }

        let keys = self.fetch().await?;
        let jwk = keys.find(kid).cloned();
        {
            let mut guard = self.cached.write().await;
            *guard = Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
            });
        }

        match jwk {
            Some(jwk) => key_from_jwk(&jwk),
            None => Err(AuthError::UnknownKey),
        }
    }

    async fn cached_find(&self, kid: &str) -> Option<Jwk> {
        let guard = self.cached.read().await;
        let cached = guard.as_ref()?;
        if cached.fetched_at.elapsed() > self.ttl {
            return None;
        }
        cached.keys.find(kid).cloned()
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        debug!("fetching JWKS from {}", self.jwks_url);
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }
}

fn key_from_jwk(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_jwk(jwk).map_err(|_| AuthError::UnknownKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JWKS: &str = r#"{
        "keys": [
            {
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": "key-2024",
                "n": "xGOr-H7A-PWG3IjqLkeh56iR_OU0j90rrXWJg2u0c8QyYB4MICRBzJO0kTJe7O9pvpvU91KPNVgYampWd5TC2VYu9lNvQhKSPhSNBQHRLBQSq4cHSdzXTWTSU0VGsoTJ",
                "e": "AQAB"
            }
        ]
    }"#;

    #[test]
    fn finds_key_by_kid() {
        let jwks: JwkSet = serde_json::from_str(SAMPLE_JWKS).unwrap();
        assert!(jwks.find("key-2024").is_some());
        assert!(jwks.find("rotated-out").is_none());
    }

    #[tokio::test]
    async fn empty_cache_is_a_miss() {
        let store = KeyStore::new(
            "https://example.auth0.com/.well-known/jwks.json".to_string(),
            Duration::from_secs(600),
        );
        assert!(store.cached_find("key-2024").await.is_none());
    }

    #[tokio::test]
    async fn stale_cache_is_a_miss() {
        let store = KeyStore::new(
            "https://example.auth0.com/.well-known/jwks.json".to_string(),
            Duration::from_secs(0),
        );
        let keys: JwkSet = serde_json::from_str(SAMPLE_JWKS).unwrap();
        {
            let mut guard = store.cached.write().await;
            *guard = Some(CachedKeys {
                keys,
                fetched_at: Instant::now() - Duration::from_secs(1),
            });
        }
        assert!(store.cached_find("key-2024").await.is_none());
    }

    #[tokio::test]
    async fn fresh_cache_resolves_kid() {
        let store = KeyStore::new(
            "https://example.auth0.com/.well-known/jwks.json".to_string(),
            Duration::from_secs(600),
        );
        let keys: JwkSet = serde_json::from_str(SAMPLE_JWKS).unwrap();
        {
            let mut guard = store.cached.write().await;
            *guard = Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
            });
        }
        assert!(store.cached_find("key-2024").await.is_some());
        assert!(store.cached_find("rotated-out").await.is_none());
    }
}
