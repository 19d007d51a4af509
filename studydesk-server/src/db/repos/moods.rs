//! Mood entry repository

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use crate::db::error::{violation, Violation};
use crate::models::MoodLabel;
use super::DbError;

/// Mood entry record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MoodEntry {
    pub id: i32,
    pub user_id: i32,
    pub entry_date: NaiveDate,
    pub mood: String,
    pub comment: Option<String>,
}

/// List filters on owner and entry date (inclusive bounds).
#[derive(Debug, Clone, Copy, Default)]
pub struct MoodFilter {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewMood {
    pub user_id: i32,
    /// Defaults to the database's current date when absent
    pub entry_date: Option<NaiveDate>,
    pub mood: MoodLabel,
    pub comment: Option<String>,
}

/// Only the mood and comment are editable.
#[derive(Debug, Clone, Default)]
pub struct MoodPatch {
    pub mood: Option<MoodLabel>,
    pub comment: Option<String>,
}

/// Mood entry repository
pub struct MoodRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MoodRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: MoodFilter) -> Result<Vec<MoodEntry>, DbError> {
        let entries = sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT id, user_id, entry_date, mood, comment
            FROM mood_entries
            WHERE ($1::int IS NULL OR user_id = $1)
              AND ($2::date IS NULL OR entry_date >= $2)
              AND ($3::date IS NULL OR entry_date <= $3)
            ORDER BY entry_date DESC, id DESC
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn get(&self, id: i32) -> Result<MoodEntry, DbError> {
        sqlx::query_as::<_, MoodEntry>(
            "SELECT id, user_id, entry_date, mood, comment FROM mood_entries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("mood entry", id))
    }

    pub async fn create(&self, new: NewMood) -> Result<MoodEntry, DbError> {
        let entry = sqlx::query_as::<_, MoodEntry>(
            r#"
            INSERT INTO mood_entries (user_id, entry_date, mood, comment)
            VALUES ($1, COALESCE($2, CURRENT_DATE), $3, $4)
            RETURNING id, user_id, entry_date, mood, comment
            "#,
        )
        .bind(new.user_id)
        .bind(new.entry_date)
        .bind(new.mood.as_str())
        .bind(&new.comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some((Violation::ForeignKey, _)) => DbError::not_found("user", new.user_id),
            _ => DbError::Sqlx(e),
        })?;

        Ok(entry)
    }

    pub async fn update(&self, id: i32, patch: MoodPatch) -> Result<MoodEntry, DbError> {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            UPDATE mood_entries SET
                mood = COALESCE($2, mood),
                comment = COALESCE($3, comment)
            WHERE id = $1
            RETURNING id, user_id, entry_date, mood, comment
            "#,
        )
        .bind(id)
        .bind(patch.mood.as_ref().map(MoodLabel::as_str))
        .bind(patch.comment.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("mood entry", id))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM mood_entries WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("mood entry", id));
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
    use crate::models::{Email, PersonName};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn entry_date_defaults_to_today() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.unwrap();
        migrations::run(&pool).await.unwrap();

        let owner = UserRepo::new(&pool)
            .create(NewUser {
                name: PersonName::new("Mood Owner").unwrap(),
                email: Email::new(&format!("moods-{}@test.dev", std::process::id())).unwrap(),
                password_hash: hash_password("secret1").unwrap(),
                role_id: None,
            })
            .await
            .unwrap();

        let repo = MoodRepo::new(&pool);
        let entry = repo
            .create(NewMood {
                user_id: owner.id,
                entry_date: None,
                mood: MoodLabel::new("tranquilo").unwrap(),
                comment: None,
            })
            .await
            .unwrap();

        let (today,): (NaiveDate,) = sqlx::query_as("SELECT CURRENT_DATE")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(entry.entry_date, today);

        let patched = repo
            .update(
                entry.id,
                MoodPatch {
                    comment: Some("after the exam".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.mood, "tranquilo");
        assert_eq!(patched.comment.as_deref(), Some("after the exam"));
        assert_eq!(patched.entry_date, entry.entry_date);

        // Cascade
        UserRepo::new(&pool).delete(owner.id).await.unwrap();
        assert!(matches!(repo.get(entry.id).await, Err(DbError::NotFound { .. })));
    }
}
