//! HS256 access tokens
//!
//! The subject is the user's email; `exp` is issue time plus the
//! configured lifetime.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthConfig, AuthError};

/// JWT claims carried by access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
}

/// Issues and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret_key.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl: config.token_ttl,
        }
    }

    /// Token lifetime in seconds (reported to clients as `expires_in`).
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for the given email.
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: email.to_owned(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str, ttl: Duration) -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            secret_key: secret.to_owned(),
            token_ttl: ttl,
        })
    }

    #[test]
    fn round_trip_subject() {
        let tokens = issuer("test-secret", Duration::minutes(30));
        let token = tokens.issue("ana@uni.edu").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "ana@uni.edu");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = issuer("one", Duration::minutes(5)).issue("a@b.co").unwrap();
        assert!(issuer("two", Duration::minutes(5)).verify(&token).is_err());
    }

    #[test]
    fn rejects_expired() {
        // Past the default 60s validation leeway
        let tokens = issuer("test-secret", Duration::minutes(-5));
        let token = tokens.issue("a@b.co").unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let tokens = issuer("test-secret", Duration::try_weeks(1_000_000_000).unwrap());
        assert!(matches!(tokens.issue("a@b.co"), Err(AuthError::ExpiryOutOfRange)));
    }

    #[test]
    fn rejects_garbage() {
        let tokens = issuer("test-secret", Duration::minutes(5));
        assert!(tokens.verify("not.a.token").is_err());
    }
}
