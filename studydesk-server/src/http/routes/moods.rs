//! Mood entry endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::repos::{MoodEntry, MoodFilter, MoodPatch, MoodRepo, NewMood};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::models::MoodLabel;
use crate::policy;

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Create mood request; the date defaults to today
#[derive(Deserialize)]
pub struct CreateMoodRequest {
    pub mood: String,
    pub comment: Option<String>,
    pub entry_date: Option<NaiveDate>,
    pub user_id: Option<i32>,
}

/// Only the mood and comment can be changed after the fact
#[derive(Deserialize)]
pub struct UpdateMoodRequest {
    pub mood: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub id: i32,
    pub user_id: i32,
    pub entry_date: NaiveDate,
    pub mood: String,
    pub comment: Option<String>,
}

impl From<MoodEntry> for MoodResponse {
    fn from(m: MoodEntry) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            entry_date: m.entry_date,
            mood: m.mood,
            comment: m.comment,
        }
    }
}

/// GET /moods?user_id=&from=&to=
async fn list_moods(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<MoodQuery>,
) -> Result<Json<Vec<MoodResponse>>, ApiError> {
    let filter = MoodFilter {
        user_id: policy::scope_owner_filter(&current.actor(), query.user_id),
        from: query.from,
        to: query.to,
    };

    let entries = MoodRepo::new(&state.pool).list(filter).await?;
    Ok(Json(entries.into_iter().map(MoodResponse::from).collect()))
}

/// GET /moods/{id}
async fn get_mood(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<MoodResponse>, ApiError> {
    let entry = MoodRepo::new(&state.pool).get(id).await?;
    policy::require_owner_or_admin(&current.actor(), entry.user_id)?;

    Ok(Json(MoodResponse::from(entry)))
}

/// POST /moods
async fn create_mood(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateMoodRequest>,
) -> Result<(StatusCode, Json<MoodResponse>), ApiError> {
    let actor = current.actor();
    let user_id = req.user_id.unwrap_or(actor.id);
    policy::require_create_for(&actor, user_id)?;

    let entry = MoodRepo::new(&state.pool)
        .create(NewMood {
            user_id,
            entry_date: req.entry_date,
            mood: MoodLabel::new(&req.mood)?,
            comment: req.comment,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MoodResponse::from(entry))))
}

/// PUT /moods/{id}
async fn update_mood(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
    Json(req): Json<UpdateMoodRequest>,
) -> Result<Json<MoodResponse>, ApiError> {
    let repo = MoodRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    policy::require_owner_or_admin(&current.actor(), existing.user_id)?;

    let patch = MoodPatch {
        mood: req.mood.as_deref().map(MoodLabel::new).transpose()?,
        comment: req.comment,
    };

    let entry = repo.update(id, patch).await?;
    Ok(Json(MoodResponse::from(entry)))
}

/// DELETE /moods/{id}
async fn delete_mood(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    let repo = MoodRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    policy::require_owner_or_admin(&current.actor(), existing.user_id)?;

    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mood routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/moods", get(list_moods).post(create_mood))
        .route(
            "/moods/{id}",
            get(get_mood).put(update_mood).delete(delete_mood),
        )
}
