//! Tutoring session and participation endpoints
//!
//! Any authenticated user can browse sessions. Admins and tutors create
//! and edit them; only admins delete. Users register and unregister
//! themselves; admins can do it for anyone.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repos::{
    NewSession, Participant, Participation, SessionPatch, SessionWithParticipants, TutoringRepo,
};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::models::{Title, TutoringRole};
use crate::policy;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub topic: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct UpdateSessionRequest {
    pub topic: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Participation request (add)
#[derive(Deserialize)]
pub struct ParticipationRequest {
    pub user_id: i32,
    pub session_id: i32,
    pub role: TutoringRole,
}

/// `?role=` on participant removal
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: TutoringRole,
}

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub role: TutoringRole,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            user_id: p.user_id,
            name: p.name,
            email: p.email,
            role: p.role,
        }
    }
}

/// Session response with its roster
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: i32,
    pub topic: String,
    pub description: Option<String>,
    pub scheduled_at: String,
    pub participants: Vec<ParticipantResponse>,
}

impl From<SessionWithParticipants> for SessionResponse {
    fn from(s: SessionWithParticipants) -> Self {
        Self {
            id: s.session.id,
            topic: s.session.topic,
            description: s.session.description,
            scheduled_at: s.session.scheduled_at.to_rfc3339(),
            participants: s
                .participants
                .into_iter()
                .map(ParticipantResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipationResponse {
    pub user_id: i32,
    pub session_id: i32,
    pub role: TutoringRole,
}

impl From<Participation> for ParticipationResponse {
    fn from(p: Participation) -> Self {
        Self {
            user_id: p.user_id,
            session_id: p.session_id,
            role: p.role,
        }
    }
}

/// GET /tutoring-sessions
async fn list_sessions(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = TutoringRepo::new(&state.pool).list().await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// GET /tutoring-sessions/{id}
async fn get_session(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = TutoringRepo::new(&state.pool).get(id).await?;
    Ok(Json(SessionResponse::from(session)))
}

/// POST /tutoring-sessions - admin or tutor
async fn create_session(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    policy::require_session_editor(&current.actor())?;

    let session = TutoringRepo::new(&state.pool)
        .create(NewSession {
            topic: Title::topic(&req.topic)?,
            description: req.description,
            scheduled_at: req.scheduled_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// PUT /tutoring-sessions/{id} - admin or tutor
async fn update_session(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    policy::require_session_editor(&current.actor())?;

    let patch = SessionPatch {
        topic: req.topic.as_deref().map(Title::topic).transpose()?,
        description: req.description,
        scheduled_at: req.scheduled_at,
    };

    let session = TutoringRepo::new(&state.pool).update(id, patch).await?;
    Ok(Json(SessionResponse::from(session)))
}

/// DELETE /tutoring-sessions/{id} - admin only
async fn delete_session(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    policy::require_admin(&current.actor())?;

    TutoringRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /tutoring-sessions/participants - self or admin
async fn add_participant(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<ParticipationRequest>,
) -> Result<(StatusCode, Json<ParticipationResponse>), ApiError> {
    policy::require_self_or_admin(&current.actor(), req.user_id)?;

    let participation = TutoringRepo::new(&state.pool)
        .add_participant(req.user_id, req.session_id, req.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ParticipationResponse::from(participation)),
    ))
}

/// DELETE /tutoring-sessions/{session_id}/participants/{user_id}?role= - self or admin
async fn remove_participant(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path((session_id, user_id)): Path<(i32, i32)>,
    Query(query): Query<RoleQuery>,
) -> Result<StatusCode, ApiError> {
    policy::require_self_or_admin(&current.actor(), user_id)?;

    TutoringRepo::new(&state.pool)
        .remove_participant(session_id, user_id, query.role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Tutoring routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tutoring-sessions", get(list_sessions).post(create_session))
        .route("/tutoring-sessions/participants", post(add_participant))
        .route(
            "/tutoring-sessions/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route(
            "/tutoring-sessions/{id}/participants/{user_id}",
            delete(remove_participant),
        )
}
