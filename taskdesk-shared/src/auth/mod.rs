//! Authentication primitives
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`jwt`]: signed, time-limited bearer tokens
//! - [`middleware`]: request authentication context and bearer extraction
//!
//! All verification is constant-time where secrets are compared: Argon2 for
//! passwords, HMAC-SHA256 for token signatures.

pub mod jwt;
pub mod middleware;
pub mod password;
