/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user and get a token
/// - `POST /auth/login` - Login and get a token
/// - `POST /auth/verify` - Check a token and return its user
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::ValidJson,
};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use taskdesk_shared::{
    auth::middleware::{bearer_token, BearerError},
    models::user::UserProfile,
    services::AuthSession,
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Unique display handle
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Optional token passed as `?token=` to the verify endpoint
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "username": "user",
///   "password": "secret1"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "email": "user@example.com",
///   "username": "user",
///   "created_at": "2025-01-01T00:00:00Z",
///   "token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, email or username already taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state
        .auth
        .register(&req.email, &req.username, &req.password)
        .await?;

    Ok(Json(session))
}

/// Login with email and password
///
/// Same response shape as registration.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(session))
}

/// Verify a token
///
/// The token is read from `Authorization: Bearer <token>`, falling back to
/// the `token` query parameter.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid or expired token, or the user no
///   longer exists
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<UserProfile>> {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(BearerError::Missing) => query
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::from(BearerError::Missing))?,
        Err(err) => return Err(err.into()),
    };

    let user = state.auth.verify_session(token).await?;

    Ok(Json(user.into()))
}
