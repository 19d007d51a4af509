//! Role repository (read-only; roles are seeded by migrations)

use sqlx::{FromRow, PgPool};

use super::DbError;

/// Role record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// Role repository
pub struct RoleRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Role>, DbError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, description FROM roles ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn get(&self, id: i32) -> Result<Role, DbError> {
        sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("role", id))
    }
}
