use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Auth0 tenant domain, e.g. "coffee-shop-application.auth0.com".
    pub domain: String,
    /// Expected `aud` claim of incoming tokens.
    pub audience: String,
    /// How long a fetched JWKS is considered fresh.
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    /// Token issuer derived from the tenant domain.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    /// Well-known key-distribution endpoint for the tenant.
    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::defaults().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DRINKS_API_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }
        if let Ok(v) = env::var("AUTH0_DOMAIN") {
            self.auth.domain = v;
        }
        if let Ok(v) = env::var("AUTH0_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Ok(v) = env::var("JWKS_CACHE_TTL_SECS") {
            self.auth.jwks_cache_ttl_secs = v.parse().unwrap_or(self.auth.jwks_cache_ttl_secs);
        }
        self
    }

    fn defaults() -> Self {
        Self {
            server: ServerConfig { port: 5000 },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            auth: AuthConfig {
                domain: "coffee-shop-application.auth0.com".to_string(),
                audience: "coffee-shop-app".to_string(),
                jwks_cache_ttl_secs: 600,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
