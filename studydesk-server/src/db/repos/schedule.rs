//! Schedule event repository
//!
//! Events carry a `[starts_at, ends_at)` window. Creation takes an
//! already-validated [`TimeWindow`]; a patch is merged with the stored row
//! inside a transaction and the merged window is validated again before
//! writing.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use crate::db::error::{violation, Violation};
use crate::models::{TimeWindow, Title};
use super::DbError;

const COLUMNS: &str = "id, title, description, starts_at, ends_at, user_id";

/// Schedule event record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ScheduleEvent {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub user_id: i32,
}

/// List filters. Dates compare against the UTC calendar date of the
/// event's start (`from`) and end (`to`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: Title,
    pub description: Option<String>,
    pub window: TimeWindow,
    pub user_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Schedule event repository
pub struct ScheduleRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ScheduleRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: EventFilter) -> Result<Vec<ScheduleEvent>, DbError> {
        let events = sqlx::query_as::<_, ScheduleEvent>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM schedule_events
            WHERE ($1::int IS NULL OR user_id = $1)
              AND ($2::date IS NULL OR (starts_at AT TIME ZONE 'UTC')::date >= $2)
              AND ($3::date IS NULL OR (ends_at AT TIME ZONE 'UTC')::date <= $3)
            ORDER BY starts_at, id
            "#
        ))
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn get(&self, id: i32) -> Result<ScheduleEvent, DbError> {
        sqlx::query_as::<_, ScheduleEvent>(&format!(
            "SELECT {COLUMNS} FROM schedule_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("schedule event", id))
    }

    pub async fn create(&self, new: NewEvent) -> Result<ScheduleEvent, DbError> {
        let event = sqlx::query_as::<_, ScheduleEvent>(&format!(
            r#"
            INSERT INTO schedule_events (title, description, starts_at, ends_at, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.title.as_str())
        .bind(&new.description)
        .bind(new.window.starts_at())
        .bind(new.window.ends_at())
        .bind(new.user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some((Violation::ForeignKey, _)) => DbError::not_found("user", new.user_id),
            _ => DbError::Sqlx(e),
        })?;

        tracing::debug!(event_id = event.id, user_id = event.user_id, "schedule event created");
        Ok(event)
    }

    /// Merge the patch into the stored event and re-check the window.
    ///
    /// The row is locked for the duration so a concurrent patch cannot
    /// slip an out-of-order window past the check.
    pub async fn update(&self, id: i32, patch: EventPatch) -> Result<ScheduleEvent, DbError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ScheduleEvent>(&format!(
            "SELECT {COLUMNS} FROM schedule_events WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("schedule event", id))?;

        let window = TimeWindow::new(
            patch.starts_at.unwrap_or(current.starts_at),
            patch.ends_at.unwrap_or(current.ends_at),
        )?;

        let title = patch.title.as_ref().map_or(current.title.as_str(), Title::as_str);
        let description = patch.description.or(current.description);

        let event = sqlx::query_as::<_, ScheduleEvent>(&format!(
            r#"
            UPDATE schedule_events
            SET title = $2, description = $3, starts_at = $4, ends_at = $5
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(&description)
        .bind(window.starts_at())
        .bind(window.ends_at())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM schedule_events WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("schedule event", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::repos::{NewUser, UserRepo};
    use crate::db::{create_pool, migrations};
    use crate::models::{Email, PersonName, ValidationError};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn patch_revalidates_merged_window() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.unwrap();
        migrations::run(&pool).await.unwrap();

        let owner = UserRepo::new(&pool)
            .create(NewUser {
                name: PersonName::new("Event Owner").unwrap(),
                email: Email::new(&format!("events-{}@test.dev", std::process::id())).unwrap(),
                password_hash: hash_password("secret1").unwrap(),
                role_id: None,
            })
            .await
            .unwrap();

        let repo = ScheduleRepo::new(&pool);
        let event = repo
            .create(NewEvent {
                title: Title::new("Exam").unwrap(),
                description: None,
                window: TimeWindow::new(at(10, 9), at(10, 11)).unwrap(),
                user_id: owner.id,
            })
            .await
            .unwrap();

        // Moving only the start past the stored end is rejected
        let bad = repo
            .update(
                event.id,
                EventPatch {
                    starts_at: Some(at(10, 12)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            bad,
            Err(DbError::Validation(ValidationError::InvalidRange { .. }))
        ));

        let moved = repo
            .update(
                event.id,
                EventPatch {
                    ends_at: Some(at(10, 13)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.title, "Exam");
        assert_eq!(moved.starts_at, at(10, 9));
        assert_eq!(moved.ends_at, at(10, 13));

        let in_range = repo
            .list(EventFilter {
                user_id: Some(owner.id),
                from: NaiveDate::from_ymd_opt(2030, 3, 10),
                to: NaiveDate::from_ymd_opt(2030, 3, 10),
            })
            .await
            .unwrap();
        assert_eq!(in_range.len(), 1);

        let later = repo
            .list(EventFilter {
                user_id: Some(owner.id),
                from: NaiveDate::from_ymd_opt(2030, 3, 11),
                to: None,
            })
            .await
            .unwrap();
        assert!(later.is_empty());

        // Cascade
        UserRepo::new(&pool).delete(owner.id).await.unwrap();
        assert!(matches!(repo.get(event.id).await, Err(DbError::NotFound { .. })));
    }
}
