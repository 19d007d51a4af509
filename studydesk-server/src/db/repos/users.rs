//! User repository
//!
//! Reads join the user's role so responses carry `{id, name, description}`
//! without a second query. The password column never leaves this module
//! except through [`Credentials`].

use sqlx::{FromRow, PgPool};

use crate::db::error::{violation, Violation};
use crate::models::{normalize_email, Email, PersonName};
use super::DbError;

const SELECT_USER: &str = r#"
    SELECT u.id, u.name, u.email, u.role_id,
           r.name AS role_name, r.description AS role_description
    FROM users u
    LEFT JOIN roles r ON r.id = u.role_id
"#;

/// User record joined with its role
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
    pub role_description: Option<String>,
}

/// Login material for a user
#[derive(Clone, FromRow)]
pub struct Credentials {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// Validated input for a new user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: PersonName,
    pub email: Email,
    pub password_hash: String,
    pub role_id: Option<i32>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<PersonName>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
    pub role_id: Option<i32>,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY u.id"))
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }

    pub async fn get(&self, id: i32) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Look up a user by email (case-insensitive on input).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.email = $1"))
            .bind(normalize_email(email))
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, DbError> {
        let creds = sqlx::query_as::<_, Credentials>(
            "SELECT id, email, password AS password_hash, role_id FROM users WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(self.pool)
        .await?;

        Ok(creds)
    }

    /// Insert a user.
    ///
    /// A taken email maps to `Conflict`; an unknown role to `NotFound`.
    pub async fn create(&self, new: NewUser) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            WITH inserted AS (
                INSERT INTO users (name, email, password, role_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, email, role_id
            )
            SELECT i.id, i.name, i.email, i.role_id,
                   r.name AS role_name, r.description AS role_description
            FROM inserted i
            LEFT JOIN roles r ON r.id = i.role_id
            "#,
        )
        .bind(new.name.as_str())
        .bind(new.email.as_str())
        .bind(&new.password_hash)
        .bind(new.role_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, new.role_id))?;

        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Apply a partial update.
    pub async fn update(&self, id: i32, patch: UserPatch) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            WITH updated AS (
                UPDATE users SET
                    name = COALESCE($2, name),
                    email = COALESCE($3, email),
                    password = COALESCE($4, password),
                    role_id = COALESCE($5, role_id)
                WHERE id = $1
                RETURNING id, name, email, role_id
            )
            SELECT d.id, d.name, d.email, d.role_id,
                   r.name AS role_name, r.description AS role_description
            FROM updated d
            LEFT JOIN roles r ON r.id = d.role_id
            "#,
        )
        .bind(id)
        .bind(patch.name.as_ref().map(PersonName::as_str))
        .bind(patch.email.as_ref().map(Email::as_str))
        .bind(patch.password_hash.as_deref())
        .bind(patch.role_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| write_error(e, patch.role_id))?
        .ok_or_else(|| DbError::not_found("user", id))?;

        Ok(user)
    }

    /// Delete a user; owned rows go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }

        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Users whose stored password is not a PBKDF2 PHC string.
    pub async fn legacy_passwords(&self) -> Result<Vec<Credentials>, DbError> {
        let rows = sqlx::query_as::<_, Credentials>(
            r#"
            SELECT id, email, password AS password_hash, role_id
            FROM users
            WHERE password NOT LIKE '$pbkdf2%'
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn set_password(&self, id: i32, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        Ok(())
    }
}

fn write_error(err: sqlx::Error, role_id: Option<i32>) -> DbError {
    match violation(&err) {
        Some((Violation::Unique, _)) => DbError::Conflict {
            message: "email already registered",
        },
        Some((Violation::ForeignKey, _)) => DbError::not_found("role", role_id.unwrap_or_default()),
        _ => DbError::Sqlx(err),
    }
}
