//! Aggregate counts for the statistics routes

use sqlx::{FromRow, PgPool};

use crate::models::TaskStatus;
use super::{DbError, User, UserRepo};

/// Task counts per status; statuses with no tasks read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

impl StatusCounts {
    fn record(&mut self, status: TaskStatus, count: i64) {
        match status {
            TaskStatus::Pending => self.pending = count,
            TaskStatus::InProgress => self.in_progress = count,
            TaskStatus::Completed => self.completed = count,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.in_progress + self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user: User,
    pub total_tasks: i64,
    pub tasks_by_status: StatusCounts,
    pub schedule_events: i64,
    pub mood_entries: i64,
}

/// System-wide totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Overview {
    pub total_users: i64,
    pub total_tasks: i64,
    pub total_schedule_events: i64,
    pub total_tutoring_sessions: i64,
    pub total_mood_entries: i64,
}

#[derive(FromRow)]
struct StatusRow {
    #[sqlx(try_from = "String")]
    status: TaskStatus,
    count: i64,
}

/// Statistics repository
pub struct StatsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn for_user(&self, user_id: i32) -> Result<UserStats, DbError> {
        let user = UserRepo::new(self.pool).get(user_id).await?;

        let rows = sqlx::query_as::<_, StatusRow>(
            "SELECT status, COUNT(*) AS count FROM tasks WHERE user_id = $1 GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut tasks_by_status = StatusCounts::default();
        for row in rows {
            tasks_by_status.record(row.status, row.count);
        }

        let (schedule_events, mood_entries): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM schedule_events WHERE user_id = $1),
                (SELECT COUNT(*) FROM mood_entries WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(UserStats {
            user,
            total_tasks: tasks_by_status.total(),
            tasks_by_status,
            schedule_events,
            mood_entries,
        })
    }

    pub async fn overview(&self) -> Result<Overview, DbError> {
        let overview = sqlx::query_as::<_, Overview>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM tasks) AS total_tasks,
                (SELECT COUNT(*) FROM schedule_events) AS total_schedule_events,
                (SELECT COUNT(*) FROM tutoring_sessions) AS total_tutoring_sessions,
                (SELECT COUNT(*) FROM mood_entries) AS total_mood_entries
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_statuses_count_as_zero() {
        let mut counts = StatusCounts::default();
        counts.record(TaskStatus::Completed, 4);
        counts.record(TaskStatus::Pending, 1);

        assert_eq!(counts.in_progress, 0);
        assert_eq!(counts.total(), 5);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_user_is_not_found() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let result = StatsRepo::new(&pool).for_user(i32::MAX).await;
        assert!(matches!(result, Err(DbError::NotFound { resource: "user", .. })));

        let overview = StatsRepo::new(&pool).overview().await.unwrap();
        assert!(overview.total_users >= 0);
    }
}
