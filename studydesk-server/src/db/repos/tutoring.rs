//! Tutoring session and participation repository
//!
//! Sessions are returned with their roster. Listing loads every roster in
//! one JOIN over `session_id = ANY($1)` and groups in memory (no N+1).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::db::error::{violation, Violation};
use crate::models::{Title, TutoringRole};
use super::DbError;

const USER_FK: &str = "tutoring_participants_user_fk";

/// Tutoring session record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TutoringSession {
    pub id: i32,
    pub topic: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

/// A roster entry: the participating user and the role they hold
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Participant {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: TutoringRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWithParticipants {
    pub session: TutoringSession,
    pub participants: Vec<Participant>,
}

/// Raw participation row (the link table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Participation {
    pub user_id: i32,
    pub session_id: i32,
    #[sqlx(try_from = "String")]
    pub role: TutoringRole,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub topic: Title,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub topic: Option<Title>,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct RosterRow {
    session_id: i32,
    #[sqlx(flatten)]
    participant: Participant,
}

/// Tutoring repository
pub struct TutoringRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TutoringRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<SessionWithParticipants>, DbError> {
        let sessions = sqlx::query_as::<_, TutoringSession>(
            "SELECT id, topic, description, scheduled_at FROM tutoring_sessions ORDER BY scheduled_at, id",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = sessions.iter().map(|s| s.id).collect();
        let mut rosters = self.rosters(&ids).await?;

        Ok(sessions
            .into_iter()
            .map(|session| SessionWithParticipants {
                participants: rosters.remove(&session.id).unwrap_or_default(),
                session,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<SessionWithParticipants, DbError> {
        let session = sqlx::query_as::<_, TutoringSession>(
            "SELECT id, topic, description, scheduled_at FROM tutoring_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("tutoring session", id))?;

        self.with_roster(session).await
    }

    pub async fn create(&self, new: NewSession) -> Result<SessionWithParticipants, DbError> {
        let session = sqlx::query_as::<_, TutoringSession>(
            r#"
            INSERT INTO tutoring_sessions (topic, description, scheduled_at)
            VALUES ($1, $2, $3)
            RETURNING id, topic, description, scheduled_at
            "#,
        )
        .bind(new.topic.as_str())
        .bind(&new.description)
        .bind(new.scheduled_at)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(session_id = session.id, "tutoring session created");
        Ok(SessionWithParticipants {
            session,
            participants: Vec::new(),
        })
    }

    pub async fn update(
        &self,
        id: i32,
        patch: SessionPatch,
    ) -> Result<SessionWithParticipants, DbError> {
        let session = sqlx::query_as::<_, TutoringSession>(
            r#"
            UPDATE tutoring_sessions SET
                topic = COALESCE($2, topic),
                description = COALESCE($3, description),
                scheduled_at = COALESCE($4, scheduled_at)
            WHERE id = $1
            RETURNING id, topic, description, scheduled_at
            "#,
        )
        .bind(id)
        .bind(patch.topic.as_ref().map(Title::as_str))
        .bind(patch.description.as_deref())
        .bind(patch.scheduled_at)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("tutoring session", id))?;

        self.with_roster(session).await
    }

    /// Delete a session; its participations go with it.
    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM tutoring_sessions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("tutoring session", id));
        }

        tracing::info!(session_id = id, "tutoring session deleted");
        Ok(())
    }

    /// Register a user in a session under a role.
    ///
    /// The `(user, session, role)` triple is the primary key; a repeat
    /// insert returns no row and maps to `Conflict`.
    pub async fn add_participant(
        &self,
        user_id: i32,
        session_id: i32,
        role: TutoringRole,
    ) -> Result<Participation, DbError> {
        let inserted = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO tutoring_participants (user_id, session_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING user_id, session_id, role
            "#,
        )
        .bind(user_id)
        .bind(session_id)
        .bind(role.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some((Violation::ForeignKey, constraint)) if constraint.as_deref() == Some(USER_FK) => {
                DbError::not_found("user", user_id)
            }
            Some((Violation::ForeignKey, _)) => DbError::not_found("tutoring session", session_id),
            _ => DbError::Sqlx(e),
        })?;

        let participation = inserted.ok_or(DbError::Conflict {
            message: "user already registered in this session with this role",
        })?;

        tracing::debug!(user_id, session_id, role = %role, "participant added");
        Ok(participation)
    }

    pub async fn remove_participant(
        &self,
        session_id: i32,
        user_id: i32,
        role: TutoringRole,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            "DELETE FROM tutoring_participants WHERE session_id = $1 AND user_id = $2 AND role = $3",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "participation",
                format!("{session_id}/{user_id}/{role}"),
            ));
        }
        Ok(())
    }

    async fn with_roster(
        &self,
        session: TutoringSession,
    ) -> Result<SessionWithParticipants, DbError> {
        let participants = self
            .rosters(&[session.id])
            .await?
            .remove(&session.id)
            .unwrap_or_default();

        Ok(SessionWithParticipants {
            session,
            participants,
        })
    }

    async fn rosters(&self, session_ids: &[i32]) -> Result<HashMap<i32, Vec<Participant>>, DbError> {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RosterRow>(
            r#"
            SELECT p.session_id, u.id AS user_id, u.name, u.email, p.role
            FROM tutoring_participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.session_id = ANY($1)
            ORDER BY p.session_id, p.role DESC, u.id
            "#,
        )
        .bind(session_ids)
        .fetch_all(self.pool)
        .await?;

        let mut rosters: HashMap<i32, Vec<Participant>> = HashMap::new();
        for row in rows {
            rosters.entry(row.session_id).or_default().push(row.participant);
        }
        Ok(rosters)
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
    async fn duplicate_participation_is_a_conflict() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.unwrap();
        migrations::run(&pool).await.unwrap();

        let user = UserRepo::new(&pool)
            .create(NewUser {
                name: PersonName::new("Tutor Tom").unwrap(),
                email: Email::new(&format!("tutoring-{}@test.dev", std::process::id())).unwrap(),
                password_hash: hash_password("secret1").unwrap(),
                role_id: None,
            })
            .await
            .unwrap();

        let repo = TutoringRepo::new(&pool);
        let created = repo
            .create(NewSession {
                topic: Title::topic("Calculus review").unwrap(),
                description: None,
                scheduled_at: Utc::now(),
            })
            .await
            .unwrap();
        let sid = created.session.id;

        repo.add_participant(user.id, sid, TutoringRole::Tutor).await.unwrap();
        let dup = repo.add_participant(user.id, sid, TutoringRole::Tutor).await;
        assert!(matches!(dup, Err(DbError::Conflict { .. })));

        // Same user, other role is a distinct participation
        repo.add_participant(user.id, sid, TutoringRole::Student).await.unwrap();

        let no_user = repo.add_participant(i32::MAX, sid, TutoringRole::Student).await;
        assert!(matches!(no_user, Err(DbError::NotFound { resource: "user", .. })));
        let no_session = repo.add_participant(user.id, i32::MAX, TutoringRole::Student).await;
        assert!(matches!(
            no_session,
            Err(DbError::NotFound { resource: "tutoring session", .. })
        ));

        let fetched = repo.get(sid).await.unwrap();
        assert_eq!(fetched.participants.len(), 2);

        repo.remove_participant(sid, user.id, TutoringRole::Tutor).await.unwrap();
        let again = repo.remove_participant(sid, user.id, TutoringRole::Tutor).await;
        assert!(matches!(again, Err(DbError::NotFound { .. })));

        repo.delete(sid).await.unwrap();
        UserRepo::new(&pool).delete(user.id).await.unwrap();
    }

    async fn participation_count(pool: &PgPool, column: &str, id: i32) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM tutoring_participants WHERE {column} = $1"
        ))
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap();
        count
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn deleting_session_or_user_drops_participations() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.unwrap();
        migrations::run(&pool).await.unwrap();

        let users = UserRepo::new(&pool);
        let pid = std::process::id();
        let tutor = users
            .create(NewUser {
                name: PersonName::new("Tutor Tina").unwrap(),
                email: Email::new(&format!("cascade-tutor-{pid}@test.dev")).unwrap(),
                password_hash: hash_password("secret1").unwrap(),
                role_id: None,
            })
            .await
            .unwrap();
        let student = users
            .create(NewUser {
                name: PersonName::new("Student Sam").unwrap(),
                email: Email::new(&format!("cascade-student-{pid}@test.dev")).unwrap(),
                password_hash: hash_password("secret1").unwrap(),
                role_id: None,
            })
            .await
            .unwrap();

        let repo = TutoringRepo::new(&pool);
        let mut sessions = Vec::new();
        for topic in ["Linear algebra", "Statistics"] {
            let created = repo
                .create(NewSession {
                    topic: Title::topic(topic).unwrap(),
                    description: None,
                    scheduled_at: Utc::now(),
                })
                .await
                .unwrap();
            let sid = created.session.id;
            repo.add_participant(tutor.id, sid, TutoringRole::Tutor).await.unwrap();
            repo.add_participant(student.id, sid, TutoringRole::Student).await.unwrap();
            sessions.push(sid);
        }
        let (first, second) = (sessions[0], sessions[1]);

        // Session side
        repo.delete(first).await.unwrap();
        assert_eq!(participation_count(&pool, "session_id", first).await, 0);
        assert_eq!(repo.get(second).await.unwrap().participants.len(), 2);

        // User side
        users.delete(student.id).await.unwrap();
        assert_eq!(participation_count(&pool, "user_id", student.id).await, 0);
        let roster = repo.get(second).await.unwrap().participants;
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user_id, tutor.id);
        assert_eq!(roster[0].role, TutoringRole::Tutor);

        repo.delete(second).await.unwrap();
        users.delete(tutor.id).await.unwrap();
    }
}
