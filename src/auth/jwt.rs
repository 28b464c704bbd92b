//! JWT Token Service
//! Mission: Issue and validate signed, time-limited bearer tokens

use crate::auth::models::{Claims, TokenPair};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Why a token failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signature was valid but the expiry has passed.
    Expired,
    /// Bad signature, malformed structure, or missing subject.
    Invalid,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Invalid => write!(f, "Could not validate credentials"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Token service for issuing and resolving bearer tokens.
///
/// Tokens are self-contained HS256 JWTs carrying only a subject and expiry,
/// verifiable without a database lookup. Access and refresh tokens differ
/// only in lifetime; either resolves at any protected endpoint.
pub struct TokenService {
    secret: String,
    access_minutes: i64,
    refresh_days: i64,
}

impl TokenService {
    /// Create a new token service with the shared signing secret.
    pub fn new(secret: String, access_minutes: i64, refresh_days: i64) -> Self {
        Self {
            secret,
            access_minutes,
            refresh_days,
        }
    }

    /// Issue an access + refresh token pair for a subject.
    pub fn issue(&self, subject: &str) -> Result<TokenPair> {
        let access_token = self.sign(subject, chrono::Duration::minutes(self.access_minutes))?;
        let refresh_token = self.sign(subject, chrono::Duration::days(self.refresh_days))?;

        debug!("Issued token pair for {}", subject);

        Ok(TokenPair {
            token_type: "bearer".to_string(),
            access_token,
            refresh_token,
        })
    }

    fn sign(&self, subject: &str, lifetime: chrono::Duration) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(lifetime)
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")
    }

    /// Verify a token's signature and expiry and return its subject.
    pub fn resolve(&self, token: &str) -> Result<String, TokenError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        if decoded.claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }

        Ok(decoded.claims.sub)
    }
}
