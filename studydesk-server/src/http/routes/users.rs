//! User endpoints
//!
//! Listing, creation and deletion are admin-only. A user may read and
//! update their own record but not change their own role.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::hash_password;
use crate::db::repos::{NewUser, User, UserPatch, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::models::{Email, NewPassword, PersonName};
use crate::policy;
use super::roles::RoleResponse;

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: Option<i32>,
}

/// Update user request; absent or null fields are left unchanged
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
}

/// User response (the password never leaves the server)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role_id: Option<i32>,
    pub role: Option<RoleResponse>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        let role = match (u.role_id, u.role_name) {
            (Some(id), Some(name)) => Some(RoleResponse {
                id,
                name,
                description: u.role_description,
            }),
            _ => None,
        };

        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role_id: u.role_id,
            role,
        }
    }
}

/// GET /users - admin only
async fn list_users(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    policy::require_admin(&current.actor())?;

    let users = UserRepo::new(&state.pool).list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/{id} - self or admin
async fn get_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<UserResponse>, ApiError> {
    policy::require_self_or_admin(&current.actor(), id)?;

    let user = UserRepo::new(&state.pool).get(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// POST /users - admin only
async fn create_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    policy::require_admin(&current.actor())?;

    let name = PersonName::new(&req.name)?;
    let email = Email::new(&req.email)?;
    let password = NewPassword::new(&req.password)?;

    let user = UserRepo::new(&state.pool)
        .create(NewUser {
            name,
            email,
            password_hash: hash_password(password.expose())?,
            role_id: req.role_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// PUT /users/{id} - self or admin; only admins may change roles
async fn update_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let actor = current.actor();
    policy::require_self_or_admin(&actor, id)?;

    let repo = UserRepo::new(&state.pool);
    let target = repo.get(id).await?;

    // Resubmitting the current role is not a role change
    let role_change = req.role_id.filter(|r| Some(*r) != target.role_id);
    policy::require_role_assignment(&actor, role_change)?;

    let patch = UserPatch {
        name: req.name.as_deref().map(PersonName::new).transpose()?,
        email: req.email.as_deref().map(Email::new).transpose()?,
        password_hash: match req.password.as_deref() {
            Some(plain) => Some(hash_password(NewPassword::new(plain)?.expose())?),
            None => None,
        },
        role_id: role_change,
    };

    let user = repo.update(id, patch).await?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /users/{id} - admin only; owned records cascade
async fn delete_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    policy::require_admin(&current.actor())?;

    UserRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Option<(i32, &str)>) -> User {
        User {
            id: 5,
            name: "Ana".into(),
            email: "ana@uni.edu".into(),
            role_id: role.map(|(id, _)| id),
            role_name: role.map(|(_, name)| name.to_owned()),
            role_description: None,
        }
    }

    #[test]
    fn response_nests_role() {
        let response = UserResponse::from(user(Some((2, "Estudiante"))));
        let role = response.role.expect("role present");
        assert_eq!(role.id, 2);
        assert_eq!(role.name, "Estudiante");
    }

    #[test]
    fn response_without_role() {
        let json = serde_json::to_value(UserResponse::from(user(None))).unwrap();
        assert!(json["role"].is_null());
        assert!(json.get("password").is_none());
    }
}
