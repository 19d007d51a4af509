//! Statistics endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::repos::{Overview, StatsRepo, StatusCounts, UserStats};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::policy;
use super::users::UserResponse;

#[derive(Debug, Serialize)]
pub struct StatusCountsResponse {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

impl From<StatusCounts> for StatusCountsResponse {
    fn from(c: StatusCounts) -> Self {
        Self {
            pending: c.pending,
            in_progress: c.in_progress,
            completed: c.completed,
        }
    }
}

/// Per-user statistics
#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub user: UserResponse,
    pub total_tasks: i64,
    pub tasks_by_status: StatusCountsResponse,
    pub schedule_events: i64,
    pub mood_entries: i64,
}

impl From<UserStats> for UserStatsResponse {
    fn from(s: UserStats) -> Self {
        Self {
            user: UserResponse::from(s.user),
            total_tasks: s.total_tasks,
            tasks_by_status: StatusCountsResponse::from(s.tasks_by_status),
            schedule_events: s.schedule_events,
            mood_entries: s.mood_entries,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub total_users: i64,
    pub total_tasks: i64,
    pub total_schedule_events: i64,
    pub total_tutoring_sessions: i64,
    pub total_mood_entries: i64,
}

impl From<Overview> for OverviewResponse {
    fn from(o: Overview) -> Self {
        Self {
            total_users: o.total_users,
            total_tasks: o.total_tasks,
            total_schedule_events: o.total_schedule_events,
            total_tutoring_sessions: o.total_tutoring_sessions,
            total_mood_entries: o.total_mood_entries,
        }
    }
}

/// GET /stats/users/{id} - self or admin
async fn user_stats(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<UserStatsResponse>, ApiError> {
    policy::require_self_or_admin(&current.actor(), id)?;

    let stats = StatsRepo::new(&state.pool).for_user(id).await?;
    Ok(Json(UserStatsResponse::from(stats)))
}

/// GET /stats/overview - admin only
async fn overview(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<OverviewResponse>, ApiError> {
    policy::require_admin(&current.actor())?;

    let overview = StatsRepo::new(&state.pool).overview().await?;
    Ok(Json(OverviewResponse::from(overview)))
}

/// Statistics routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats/users/{id}", get(user_stats))
        .route("/stats/overview", get(overview))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_counts_serialize_all_keys() {
        let json = serde_json::to_value(StatusCountsResponse::from(StatusCounts {
            pending: 2,
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(json["pending"], 2);
        assert_eq!(json["in_progress"], 0);
        assert_eq!(json["completed"], 0);
    }
}
