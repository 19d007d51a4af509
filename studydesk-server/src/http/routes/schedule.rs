//! Schedule event endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repos::{EventFilter, EventPatch, NewEvent, ScheduleEvent, ScheduleRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::models::{TimeWindow, Title};
use crate::policy;

/// Query parameters: `from` bounds the start date, `to` the end date
#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub user_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Schedule event response
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: String,
    pub ends_at: String,
    pub user_id: i32,
}

impl From<ScheduleEvent> for EventResponse {
    fn from(e: ScheduleEvent) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            starts_at: e.starts_at.to_rfc3339(),
            ends_at: e.ends_at.to_rfc3339(),
            user_id: e.user_id,
        }
    }
}

/// GET /schedule?user_id=&from=&to=
async fn list_events(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let filter = EventFilter {
        user_id: policy::scope_owner_filter(&current.actor(), query.user_id),
        from: query.from,
        to: query.to,
    };

    let events = ScheduleRepo::new(&state.pool).list(filter).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// GET /schedule/{id}
async fn get_event(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<EventResponse>, ApiError> {
    let event = ScheduleRepo::new(&state.pool).get(id).await?;
    policy::require_owner_or_admin(&current.actor(), event.user_id)?;

    Ok(Json(EventResponse::from(event)))
}

/// POST /schedule
async fn create_event(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let actor = current.actor();
    let user_id = req.user_id.unwrap_or(actor.id);
    policy::require_create_for(&actor, user_id)?;

    let new = NewEvent {
        title: Title::new(&req.title)?,
        description: req.description,
        window: TimeWindow::new(req.starts_at, req.ends_at)?,
        user_id,
    };

    let event = ScheduleRepo::new(&state.pool).create(new).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// PUT /schedule/{id} - patch, then the merged window is re-validated
async fn update_event(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let repo = ScheduleRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    policy::require_owner_or_admin(&current.actor(), existing.user_id)?;

    let patch = EventPatch {
        title: req.title.as_deref().map(Title::new).transpose()?,
        description: req.description,
        starts_at: req.starts_at,
        ends_at: req.ends_at,
    };

    let event = repo.update(id, patch).await?;
    Ok(Json(EventResponse::from(event)))
}

/// DELETE /schedule/{id}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    let repo = ScheduleRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    policy::require_owner_or_admin(&current.actor(), existing.user_id)?;

    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Schedule routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schedule", get(list_events).post(create_event))
        .route(
            "/schedule/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn response_uses_rfc3339() {
        let event = ScheduleEvent {
            id: 1,
            title: "Lab".into(),
            description: None,
            starts_at: Utc.with_ymd_and_hms(2030, 3, 10, 9, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2030, 3, 10, 11, 30, 0).unwrap(),
            user_id: 4,
        };
        let response = EventResponse::from(event);
        assert_eq!(response.starts_at, "2030-03-10T09:00:00+00:00");
        assert_eq!(response.ends_at, "2030-03-10T11:30:00+00:00");
    }

    #[test]
    fn create_request_accepts_offsets() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"title": "Lab", "starts_at": "2030-03-10T10:00:00+01:00", "ends_at": "2030-03-10T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.starts_at, Utc.with_ymd_and_hms(2030, 3, 10, 9, 0, 0).unwrap());
    }
}
