//! Bearer token issuance and verification
//!
//! Tokens are HS256-signed JWTs carrying the user's id and email. They are
//! stateless: nothing is persisted, and a token is accepted purely on the
//! strength of its signature, issuer and expiry. There is no refresh flow;
//! once a token expires the user logs in again.
//!
//! # Claims
//!
//! - `sub`: user id
//! - `email`: user email at issuance time
//! - `iss`: always `"taskdesk"`
//! - `iat` / `exp`: Unix timestamps
//!
//! The signing secret is passed in explicitly by whoever builds the
//! [`TokenService`]; this module never reads ambient configuration.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Issuer written into and required from every token
pub const TOKEN_ISSUER: &str = "taskdesk";

/// Default token lifetime in minutes
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, algorithm, issuer or payload rejected
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Email of the user the token was issued to
    pub email: String,

    /// Issuer - Always "taskdesk"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Builds claims issued at `now` that expire after `ttl`
    pub fn new(user_id: Uuid, email: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id,
            email: email.into(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Whether the token is expired at `now` (expiry instant included)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Identity carried by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: Uuid,
    pub email: String,
}

/// Issues and verifies signed bearer tokens
///
/// Cheap to clone; one instance is built at startup from configuration and
/// shared by every request.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service signing with `secret`
    ///
    /// The secret is expected to have been checked for length at startup.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is checked against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Creates a token service with the default 30 minute lifetime
    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for the given identity, valid from now
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email, now, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns the identity it carries
    pub fn verify(&self, token: &str) -> Result<TokenIdentity, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token as if the current time were `now`
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` when `now` is at or past the encoded expiry
    /// - `JwtError::Invalid` for a bad signature, wrong algorithm or issuer,
    ///   or a payload that does not decode
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenIdentity, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| JwtError::Invalid(e.to_string()))?;

        let claims = token_data.claims;
        if claims.is_expired_at(now) {
            return Err(JwtError::Expired);
        }

        Ok(TokenIdentity {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}
