/// API tests for registration, login and token verification
mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TestContext, TEST_SECRET};
use serde_json::json;
use taskdesk_shared::auth::jwt::TokenService;
use uuid::Uuid;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_returns_user_and_token() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "alice@example.com",
                "username": "alice",
                "password": "secret1"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].is_string());
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["username"], "alice");
    assert!(body["created_at"].is_string());
    assert!(body["token"].is_string());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_and_username() {
    let ctx = TestContext::new();
    let first = json!({"email": "a@example.com", "username": "alice", "password": "secret1"});
    ctx.send("POST", "/auth/register", None, Some(first)).await;

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({"email": "a@example.com", "username": "other", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Email already registered");

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({"email": "b@example.com", "username": "alice", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already taken");
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new();

    let cases = [
        json!({"email": "not-an-email", "username": "u", "password": "secret1"}),
        json!({"email": "a@example.com", "username": "", "password": "secret1"}),
        json!({"email": "a@example.com", "username": "u", "password": "12345"}),
        json!({"email": "a@example.com", "password": "secret1"}),
    ];

    for case in cases {
        let (status, body) = ctx.send("POST", "/auth/register", None, Some(case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected body: {}", body);
        assert_eq!(body["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_login_success_and_failures() {
    let ctx = TestContext::new();
    ctx.send(
        "POST",
        "/auth/register",
        None,
        Some(json!({"email": "a@example.com", "username": "alice", "password": "secret1"})),
    )
    .await;

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "a@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body["token"].is_string());

    let (wrong_status, wrong_body) = ctx
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "a@example.com", "password": "wrong-password"})),
        )
        .await;
    let (unknown_status, unknown_body) = ctx
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "secret1"})),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_verify_with_header_and_query() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.register_user().await;

    let (status, body) = ctx.send("POST", "/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.to_string());
    assert!(body.get("token").is_none());

    let uri = format!("/auth/verify?token={}", token);
    let (status, body) = ctx.send("POST", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.to_string());
}

#[tokio::test]
async fn test_verify_rejects_bad_tokens() {
    let ctx = TestContext::new();
    let (user_id, _) = ctx.register_user().await;

    let (status, _) = ctx.send("POST", "/auth/verify", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.send("POST", "/auth/verify", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = TokenService::with_default_ttl(TEST_SECRET)
        .issue_at(user_id, "x@example.com", Utc::now() - Duration::hours(1))
        .unwrap();
    let (status, body) = ctx.send("POST", "/auth/verify", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");

    let foreign = TokenService::with_default_ttl("a-completely-different-secret-of-32-bytes")
        .issue(user_id, "x@example.com")
        .unwrap();
    let (status, _) = ctx.send("POST", "/auth/verify", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_rejects_deleted_user() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.register_user().await;

    ctx.users.remove(user_id).await;

    let (status, body) = ctx.send("POST", "/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");

    let (status, _) = ctx.send("GET", "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_rejected() {
    let ctx = TestContext::new();
    let token = TokenService::with_default_ttl(TEST_SECRET)
        .issue(Uuid::new_v4(), "ghost@example.com")
        .unwrap();

    let (status, _) = ctx.send("GET", "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
