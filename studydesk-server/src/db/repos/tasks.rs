//! Task repository

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use crate::db::error::{violation, Violation};
use crate::models::{TaskStatus, Title};
use super::DbError;

/// Task record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub user_id: i32,
}

/// List filters; `None` means unfiltered.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub user_id: Option<i32>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: Title,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub user_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

/// Task repository
pub struct TaskRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>, DbError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, status, user_id
            FROM tasks
            WHERE ($1::int IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn get(&self, id: i32) -> Result<Task, DbError> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, description, due_date, status, user_id FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("task", id))
    }

    /// Insert a task; an unknown owner maps to `NotFound`.
    pub async fn create(&self, new: NewTask) -> Result<Task, DbError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, due_date, status, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, due_date, status, user_id
            "#,
        )
        .bind(new.title.as_str())
        .bind(&new.description)
        .bind(new.due_date)
        .bind(new.status.as_str())
        .bind(new.user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some((Violation::ForeignKey, _)) => DbError::not_found("user", new.user_id),
            _ => DbError::Sqlx(e),
        })?;

        tracing::debug!(task_id = task.id, user_id = task.user_id, "task created");
        Ok(task)
    }

    pub async fn update(&self, id: i32, patch: TaskPatch) -> Result<Task, DbError> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                status = COALESCE($5, status)
            WHERE id = $1
            RETURNING id, title, description, due_date, status, user_id
            "#,
        )
        .bind(id)
        .bind(patch.title.as_ref().map(Title::as_str))
        .bind(patch.description.as_deref())
        .bind(patch.due_date)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("task", id))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("task", id));
        }
        Ok(())
    }
}
