/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::{
    auth::{
        jwt::TokenService,
        middleware::{bearer_token, AuthContext},
    },
    services::{AuthService, TaskService},
    store::{PgTaskStore, PgUserStore, TaskStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and session checks
    pub auth: AuthService,

    /// Task CRUD
    pub tasks: TaskService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state backed by PostgreSQL
    pub fn new(db: PgPool, config: Config) -> Self {
        Self::with_stores(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgTaskStore::new(db)),
            config,
        )
    }

    /// Creates application state over arbitrary stores
    pub fn with_stores(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        config: Config,
    ) -> Self {
        let tokens = TokenService::new(
            &config.jwt.secret,
            Duration::minutes(config.jwt.expiration_minutes),
        );

        Self {
            auth: AuthService::new(users, tokens),
            tasks: TaskService::new(tasks),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public)
/// ├── /auth/
/// │   ├── POST /register        # public
/// │   ├── POST /login           # public
/// │   └── POST /verify          # bearer header or ?token=
/// └── /tasks                    # bearer required
///     ├── GET    /tasks         # List, ?completed=&priority=
///     ├── POST   /tasks         # Create
///     ├── GET    /tasks/:id
///     ├── PUT    /tasks/:id     # Partial update
///     └── DELETE /tasks/:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Session check (task routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/verify", post(routes::auth::verify));

    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Session middleware for task routes
///
/// Verifies the bearer token, reloads the user so that tokens of deleted
/// accounts are refused, then injects `AuthContext` into request extensions.
async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;
    let user = state.auth.verify_session(token).await?;

    req.extensions_mut()
        .insert(AuthContext::new(user.id, user.email));

    Ok(next.run(req).await)
}
