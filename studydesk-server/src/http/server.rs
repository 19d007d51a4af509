//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::{AuthConfig, TokenIssuer};

/// Default bind address when `STUDYDESK_BIND` is unset
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
        }
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(pool: PgPool, auth: &AuthConfig) -> Self {
        Self {
            pool,
            tokens: TokenIssuer::new(auth),
        }
    }
}

/// Build the application router (without CORS, which depends on config).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::roles::router())
        .merge(routes::users::router())
        .merge(routes::tasks::router())
        .merge(routes::schedule::router())
        .merge(routes::moods::router())
        .merge(routes::tutoring::router())
        .merge(routes::stats::router())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    // Localhost only: the API port itself plus the usual frontend dev port
    let port = config.bind_addr.port();
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000".to_owned(),
        "http://127.0.0.1:3000".to_owned(),
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// run_server(pool, ServerConfig::default(), &AuthConfig::from_env()).await?;
/// ```
pub async fn run_server(
    pool: PgPool,
    config: ServerConfig,
    auth: &AuthConfig,
) -> Result<(), ServerError> {
    let state = AppState::new(pool, auth);
    tracing::info!(token_ttl_secs = state.tokens.ttl_seconds(), "auth configured");

    let app = build_router(state).layer(cors_layer(&config));

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
        assert!(!config.cors_permissive);
    }

    mod router {
        use super::*;
        use axum::body::{to_bytes, Body};
        use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
        use axum::http::{Request, StatusCode};
        use sqlx::postgres::PgPoolOptions;
        use tower::ServiceExt;

        /// Router over a pool that never connects; only DB-free paths are exercised.
        fn app() -> Router {
            let pool = PgPoolOptions::new()
                .connect_lazy("postgres://localhost/studydesk_test")
                .unwrap();
            build_router(AppState::new(pool, &AuthConfig::with_secret("router-test")))
        }

        #[tokio::test]
        async fn health_and_root_respond_without_auth() {
            for uri in ["/", "/health"] {
                let response = app()
                    .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);

                let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
                let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
                assert_eq!(body["status"], "ok");
            }
        }

        #[tokio::test]
        async fn protected_routes_require_bearer_token() {
            for uri in ["/auth/me", "/users", "/tasks", "/schedule", "/moods", "/roles", "/stats/overview"] {
                let response = app()
                    .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
                assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
            }
        }

        #[tokio::test]
        async fn invalid_token_is_unauthorized() {
            let response = app()
                .oneshot(
                    Request::builder()
                        .uri("/tasks")
                        .header(AUTHORIZATION, "Bearer not.a.token")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn token_from_another_secret_is_unauthorized() {
            let foreign = TokenIssuer::new(&AuthConfig::with_secret("someone-else"))
                .issue("admin@uni.edu")
                .unwrap();

            let response = app()
                .oneshot(
                    Request::builder()
                        .uri("/users")
                        .header(AUTHORIZATION, format!("Bearer {foreign}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        async fn send(
            app: &Router,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<serde_json::Value>,
        ) -> (StatusCode, serde_json::Value) {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(json) => request
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => request.body(Body::empty()).unwrap(),
            };

            let response = app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }

        async fn form_login(app: &Router, email: &str, password: &str) -> String {
            let body = format!("username={}&password={password}", email.replace('@', "%40"));
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/auth/login-form")
                        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["token_type"], "bearer");
            assert_eq!(body["user"]["email"], email);
            body["access_token"].as_str().unwrap().to_owned()
        }

        #[tokio::test]
        #[ignore = "requires database"]
        async fn student_is_scoped_to_own_records() {
            use crate::auth::hash_password;
            use crate::db::{migrations, NewUser, UserRepo};
            use crate::models::{Email, PersonName};
            use crate::policy::{ADMIN_ROLE_ID, STUDENT_ROLE_ID};

            let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
            let pool = crate::db::create_pool(&url).await.unwrap();
            migrations::run(&pool).await.unwrap();

            let pid = std::process::id();
            let admin_email = format!("router-admin-{pid}@test.dev");
            let student_email = format!("router-student-{pid}@test.dev");

            let admin = UserRepo::new(&pool)
                .create(NewUser {
                    name: PersonName::new("Router Admin").unwrap(),
                    email: Email::new(&admin_email).unwrap(),
                    password_hash: hash_password("admin-pass").unwrap(),
                    role_id: Some(ADMIN_ROLE_ID),
                })
                .await
                .unwrap();

            let app = build_router(AppState::new(pool.clone(), &AuthConfig::with_secret("router-db-test")));
            let admin_token = form_login(&app, &admin_email, "admin-pass").await;

            for (email, password) in [(admin_email.as_str(), "wrong-pass"), ("nobody@test.dev", "admin-pass")] {
                let (status, _) = send(
                    &app,
                    "POST",
                    "/auth/login",
                    None,
                    Some(serde_json::json!({ "email": email, "password": password })),
                )
                .await;
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{email}");
            }

            let (status, student) = send(
                &app,
                "POST",
                "/users",
                Some(&admin_token),
                Some(serde_json::json!({
                    "name": "Router Student",
                    "email": student_email,
                    "password": "student-pass",
                    "role_id": STUDENT_ROLE_ID,
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            let student_id = student["id"].as_i64().unwrap();

            let student_token = form_login(&app, &student_email, "student-pass").await;

            let (status, _) = send(&app, "GET", "/users", Some(&student_token), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN);

            let (status, _) = send(
                &app,
                "POST",
                "/tasks",
                Some(&admin_token),
                Some(serde_json::json!({ "title": "Admin task" })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);

            let (status, _) = send(
                &app,
                "POST",
                "/tasks",
                Some(&student_token),
                Some(serde_json::json!({ "title": "Student task" })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);

            // A student asking for someone else's list still gets their own
            let (status, tasks) = send(
                &app,
                "GET",
                &format!("/tasks?user_id={}", admin.id),
                Some(&student_token),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            let tasks = tasks.as_array().unwrap();
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0]["user_id"].as_i64(), Some(student_id));
            assert_eq!(tasks[0]["title"], "Student task");

            let (status, tasks) = send(
                &app,
                "GET",
                &format!("/tasks?user_id={}", admin.id),
                Some(&admin_token),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(tasks
                .as_array()
                .unwrap()
                .iter()
                .all(|t| t["user_id"].as_i64() == Some(i64::from(admin.id))));

            let users = UserRepo::new(&pool);
            users.delete(student_id as i32).await.unwrap();
            users.delete(admin.id).await.unwrap();
        }
    }
}
