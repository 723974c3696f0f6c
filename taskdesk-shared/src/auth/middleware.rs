//! Request authentication context
//!
//! The API layer verifies the bearer token, reloads the user, and inserts an
//! [`AuthContext`] into the request extensions. Task handlers extract it with
//! Axum's `Extension` extractor and pass `user_id` on to the task service,
//! which trusts it as already verified.

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email of the authenticated user
    pub email: String,
}

impl AuthContext {
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}

/// Why a bearer token could not be read from the headers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    /// No Authorization header
    #[error("Missing authorization header")]
    Missing,

    /// Header present but not `Bearer <token>`
    #[error("Expected Bearer token")]
    InvalidFormat,
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(BearerError::Missing)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(BearerError::InvalidFormat)?;

    if token.is_empty() {
        return Err(BearerError::InvalidFormat);
    }

    Ok(token)
}
