//! Login and current-user endpoints
//!
//! `/auth/login` takes JSON; `/auth/login-form` takes the OAuth2
//! password-flow form (`username` carries the email). Both answer with a
//! bearer token and the user record.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::{verify_dummy, verify_password};
use crate::db::repos::UserRepo;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;
use super::users::UserResponse;

/// JSON login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Form login request (OAuth2 password flow field names)
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Check credentials and issue a token.
async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<TokenResponse, ApiError> {
    let repo = UserRepo::new(&state.pool);

    // Unknown emails still pay for one hash check
    let verified = match repo.find_credentials(email).await? {
        Some(creds) if verify_password(password, &creds.password_hash) => Some(creds),
        Some(_) => None,
        None => {
            verify_dummy(password);
            None
        }
    };

    let creds = verified.ok_or_else(|| {
        tracing::info!("failed login attempt");
        ApiError::unauthorized("incorrect email or password")
    })?;

    let access_token = state.tokens.issue(&creds.email)?;
    let user = repo.get(creds.id).await?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.tokens.ttl_seconds(),
        user: UserResponse::from(user),
    })
}

/// POST /auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    authenticate(&state, &req.email, &req.password).await.map(Json)
}

/// POST /auth/login-form
async fn login_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    authenticate(&state, &form.username, &form.password).await.map(Json)
}

/// GET /auth/me
async fn me(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(current.0))
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/login-form", post(login_form))
        .route("/auth/me", get(me))
}
