//! Registration, login and session verification
//!
//! Ties together password hashing, token issuance and the user store. Argon2
//! is CPU-heavy, so hashing and verification run on the blocking pool.

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::jwt::{JwtError, TokenService};
use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::models::user::{NewUser, User, UserProfile};
use crate::store::{StoreError, UserStore};

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already taken")]
    DuplicateUsername,

    /// Shared by every failed login, whatever the cause
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    /// Token was valid but its user no longer exists
    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(JwtError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::ExpiredToken,
            JwtError::Invalid(_) => AuthError::InvalidToken,
            other @ JwtError::CreateError(_) => AuthError::Token(other),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { constraint } if constraint.contains("email") => {
                AuthError::DuplicateEmail
            }
            StoreError::Conflict { constraint } if constraint.contains("username") => {
                AuthError::DuplicateUsername
            }
            other => AuthError::Store(other),
        }
    }
}

/// Hash checked against when the email is unknown, so that a failed lookup
/// costs as much as a wrong password
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("taskdesk-dummy-password").ok())
        .as_deref()
}

/// A user together with a freshly issued token
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

/// Account and session operations
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account and logs it in
    ///
    /// # Errors
    ///
    /// - `AuthError::DuplicateEmail` if the email is registered, checked first
    /// - `AuthError::DuplicateUsername` if the username is taken
    /// - `AuthError::Validation` for a blank email, username or password
    #[instrument(name = "AuthService: register", skip_all, fields(email = %email))]
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        if email.trim().is_empty() || username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email, username and password are required".to_string(),
            ));
        }

        if self.users.find_by_email(email).await?.is_some() {
            warn!("Registration rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }
        if self.users.find_by_username(username).await?.is_some() {
            warn!("Registration rejected: username already taken");
            return Err(AuthError::DuplicateUsername);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))??;

        // Unique constraints catch a concurrent registration that passed the checks
        let user = self
            .users
            .insert(&NewUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash,
            })
            .await?;

        let token = self.tokens.issue(user.id, &user.email)?;
        info!(user_id = %user.id, "User registered");

        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }

    /// Checks credentials and issues a token
    ///
    /// An unknown email and a wrong password both yield
    /// `AuthError::InvalidCredentials`.
    #[instrument(name = "AuthService: login", skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            let password = password.to_string();
            let _ = tokio::task::spawn_blocking(move || {
                dummy_hash().map(|hash| verify_password(&password, hash))
            })
            .await;

            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| PasswordError::VerifyError(e.to_string()))??;

        if !valid {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }

    /// Verifies a token and reloads its user
    ///
    /// # Errors
    ///
    /// - `AuthError::ExpiredToken` / `AuthError::InvalidToken` from the token check
    /// - `AuthError::UserNotFound` if the user was deleted after issuance
    pub async fn verify_session(&self, token: &str) -> Result<User, AuthError> {
        let identity = self.tokens.verify(token)?;
        self.load_user(identity.user_id).await
    }

    async fn load_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %user_id, "Token refers to a user that no longer exists");
                Err(AuthError::UserNotFound)
            }
        }
    }
}
