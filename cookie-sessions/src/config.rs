//! Central configuration for the cookie-sessions crate
//!
//! Stores and the cache are deliberately not module-scope singletons: an
//! [`AuthConfig`] plus explicitly constructed store handles are passed into
//! [`SessionManager::new`](crate::SessionManager::new), so tests and embedders
//! can wire fakes without touching process-wide state.

use std::env;
use std::sync::LazyLock;

use thiserror::Error;

/// Cookie name used when `SESSION_COOKIE_NAME` is not set.
pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("cookie-sessions-v0".to_string())
});

/// Session lifetime in seconds when `SESSION_COOKIE_MAX_AGE` is not set.
/// Default: 30 days.
pub static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30 * 24 * 60 * 60)
});

#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
}

/// Runtime configuration for the session authentication stack.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for the token keyed hash.
    pub secret: Vec<u8>,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Session lifetime in seconds, applied at creation.
    pub session_max_age: u64,
    /// Deployment host, used as the cookie domain outside local runs.
    pub host: String,
    /// Local runs get `Domain=localhost` and no `Secure` flag.
    pub is_local: bool,
}

impl AuthConfig {
    /// Build a config with the env-derived cookie defaults.
    pub fn new(secret: impl Into<Vec<u8>>, host: impl Into<String>, is_local: bool) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: SESSION_COOKIE_NAME.clone(),
            session_max_age: *SESSION_COOKIE_MAX_AGE,
            host: host.into(),
            is_local,
        }
    }

    /// Build a config from the environment.
    ///
    /// Reads `AUTH_SERVER_SECRET` (required), `BASE_HOST` (required unless
    /// `RUNNING_LOCALLY=true`), plus the cookie defaults above. A `.env` file
    /// is loaded if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let secret = env::var("AUTH_SERVER_SECRET")
            .map_err(|_| ConfigError::MissingEnv("AUTH_SERVER_SECRET".to_string()))?;

        let is_local = env::var("RUNNING_LOCALLY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let host = match env::var("BASE_HOST") {
            Ok(host) => host,
            Err(_) if is_local => "localhost".to_string(),
            Err(_) => return Err(ConfigError::MissingEnv("BASE_HOST".to_string())),
        };

        Ok(Self::new(secret.into_bytes(), host, is_local))
    }

    /// Domain attribute for cookies issued with this config.
    pub fn cookie_domain(&self) -> &str {
        if self.is_local { "localhost" } else { &self.host }
    }
}
