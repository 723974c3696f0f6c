//! Common test utilities for API tests
//!
//! Builds the real router over in-memory stores, so the whole HTTP stack
//! (routing, session middleware, validation, error mapping) runs without a
//! database.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, LogFormat};
use taskdesk_shared::store::{MemoryTaskStore, MemoryUserStore};
use tower::Service as _;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the router and its stores
pub struct TestContext {
    pub app: axum::Router,
    pub users: Arc<MemoryUserStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub config: Config,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiration_minutes: 30,
        },
        log_format: LogFormat::Pretty,
    }
}

impl TestContext {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let tasks = Arc::new(MemoryTaskStore::new());
        let config = test_config();

        let state = AppState::with_stores(users.clone(), tasks.clone(), config.clone());
        let app = build_router(state);

        Self {
            app,
            users,
            tasks,
            config,
        }
    }

    /// Sends a request and returns the status and parsed JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    /// Registers a fresh user and returns (user id, token)
    pub async fn register_user(&self) -> (Uuid, String) {
        let suffix = Uuid::new_v4().simple().to_string();
        let (status, body) = self
            .send(
                "POST",
                "/auth/register",
                None,
                Some(serde_json::json!({
                    "email": format!("{}@example.com", suffix),
                    "username": format!("user_{}", &suffix[..12]),
                    "password": "secret1",
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "register failed: {}", body);

        let id = body["id"].as_str().unwrap().parse().unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (id, token)
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let (status, task) = self.send("POST", "/tasks", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", task);
        task
    }
}
