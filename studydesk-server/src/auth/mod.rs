//! Authentication primitives
//!
//! - PBKDF2 password hashing and verification
//! - HS256 JWT issuance and verification
//! - Auth configuration loaded from the environment

pub mod password;
pub mod token;

use chrono::Duration;

pub use password::{hash_password, is_password_hash, verify_dummy, verify_password};
pub use token::{Claims, TokenIssuer};

/// Development fallback for `SECRET_KEY`
const DEV_SECRET_KEY: &str = "studydesk-dev-secret-change-me";

/// Default token lifetime in minutes
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Longest accepted token lifetime (30 days)
const MAX_TOKEN_TTL_MINUTES: i64 = 30 * 24 * 60;

/// Authentication error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("token expiry out of range")]
    ExpiryOutOfRange,
}

/// Auth configuration
///
/// Loaded from environment variables:
/// - `SECRET_KEY`: HMAC secret for tokens (a development default is used when unset)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: token lifetime (default: 30)
#[derive(Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let secret_key = match std::env::var("SECRET_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => {
                tracing::warn!("SECRET_KEY not set, using development secret");
                DEV_SECRET_KEY.to_owned()
            }
        };

        let token_ttl = token_ttl(std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES").ok().as_deref());

        Self {
            secret_key,
            token_ttl,
        }
    }

    /// Create config with an explicit secret (for testing)
    pub fn with_secret(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }
}

/// Parse a lifetime in minutes; unset, malformed or out-of-range values
/// fall back to the default.
fn token_ttl(raw: Option<&str>) -> Duration {
    let default = Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES);
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<i64>().ok().filter(|m| (1..=MAX_TOKEN_TTL_MINUTES).contains(m)) {
        Some(minutes) => Duration::try_minutes(minutes).unwrap_or(default),
        None => {
            tracing::warn!(
                value = raw,
                max = MAX_TOKEN_TTL_MINUTES,
                "ACCESS_TOKEN_EXPIRE_MINUTES out of range, using default"
            );
            default
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"***")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}
