//! Role endpoints (read-only)

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::repos::{Role, RoleRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;

/// Role response
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
        }
    }
}

/// GET /roles
async fn list_roles(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    let roles = RoleRepo::new(&state.pool).list().await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// GET /roles/{id}
async fn get_role(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = RoleRepo::new(&state.pool).get(id).await?;
    Ok(Json(RoleResponse::from(role)))
}

/// Role routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/{id}", get(get_role))
}
