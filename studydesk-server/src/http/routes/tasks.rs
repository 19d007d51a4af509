//! Task endpoints
//!
//! Non-admins only ever see and touch their own tasks; a `user_id`
//! filter from them is replaced by their own id.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::repos::{NewTask, Task, TaskFilter, TaskPatch, TaskRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::models::{TaskStatus, Title};
use crate::policy;

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub user_id: Option<i32>,
    pub status: Option<TaskStatus>,
}

/// Create task request; `user_id` defaults to the caller
#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    pub user_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

/// Task response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub user_id: i32,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            due_date: t.due_date,
            status: t.status,
            user_id: t.user_id,
        }
    }
}

/// GET /tasks?user_id=&status=
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let filter = TaskFilter {
        user_id: policy::scope_owner_filter(&current.actor(), query.user_id),
        status: query.status,
    };

    let tasks = TaskRepo::new(&state.pool).list(filter).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// GET /tasks/{id}
async fn get_task(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = TaskRepo::new(&state.pool).get(id).await?;
    policy::require_owner_or_admin(&current.actor(), task.user_id)?;

    Ok(Json(TaskResponse::from(task)))
}

/// POST /tasks
async fn create_task(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let actor = current.actor();
    let user_id = req.user_id.unwrap_or(actor.id);
    policy::require_create_for(&actor, user_id)?;

    let task = TaskRepo::new(&state.pool)
        .create(NewTask {
            title: Title::new(&req.title)?,
            description: req.description,
            due_date: req.due_date,
            status: req.status,
            user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// PUT /tasks/{id} - patch semantics
async fn update_task(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let repo = TaskRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    policy::require_owner_or_admin(&current.actor(), existing.user_id)?;

    let patch = TaskPatch {
        title: req.title.as_deref().map(Title::new).transpose()?,
        description: req.description,
        due_date: req.due_date,
        status: req.status,
    };

    let task = repo.update(id, patch).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// DELETE /tasks/{id}
async fn delete_task(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    let repo = TaskRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    policy::require_owner_or_admin(&current.actor(), existing.user_id)?;

    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Task routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
