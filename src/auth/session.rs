//! Session tokens (HS256 JWT).
//!
//! Expiry is checked against the caller-supplied instant rather than the
//! system clock, so sessions age with the service [`Clock`](crate::clock::Clock).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session token errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed token or bad signature.
    #[error("invalid session token")]
    Invalid,

    /// Token is past its expiry.
    #[error("session token expired")]
    Expired,

    /// Token could not be signed.
    #[error("failed to sign session token: {0}")]
    Encoding(String),
}

/// Session token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account ID.
    pub sub: i64,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Issued at (Unix milliseconds), compared against password changes.
    pub iat_ms: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionTokens {
    /// Create a token service from a signing secret and a token lifetime.
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    /// Token lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a session token for an account.
    pub fn issue(&self, account_id: i64, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: account_id,
            iat,
            iat_ms: now.timestamp_millis(),
            exp: iat + self.lifetime.num_seconds(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a session token's signature and expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                tracing::debug!("Session token rejected: {}", e);
                TokenError::Invalid
            },
        )?;

        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// Whether the password changed after a token issued at `iat_ms` (Unix
/// milliseconds). A session issued in the same millisecond as the change is
/// still current.
pub fn changed_password_after(password_changed_at: Option<DateTime<Utc>>, iat_ms: i64) -> bool {
    password_changed_at.is_some_and(|changed| iat_ms < changed.timestamp_millis())
}
