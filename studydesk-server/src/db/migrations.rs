//! Schema creation and role seeding
//!
//! Idempotent: every statement is `IF NOT EXISTS`, and roles are only
//! seeded into an empty table.

use sqlx::PgPool;

use super::DbError;

/// Seeded roles, inserted in id order (1 = admin, 2 = student, 3 = tutor).
const DEFAULT_ROLES: [(&str, &str); 3] = [
    ("Administrador", "Acceso completo al sistema"),
    ("Estudiante", "Usuario estudiante básico"),
    ("Tutor", "Usuario que puede dar tutorías"),
];

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            id SERIAL PRIMARY KEY,
            name VARCHAR(50) NOT NULL UNIQUE,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NOT NULL,
            password TEXT NOT NULL,
            role_id INTEGER,
            CONSTRAINT users_email_key UNIQUE (email),
            CONSTRAINT users_role_fk FOREIGN KEY (role_id)
                REFERENCES roles(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id SERIAL PRIMARY KEY,
            title VARCHAR(100) NOT NULL,
            description TEXT,
            due_date DATE,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            CONSTRAINT tasks_status_check
                CHECK (status IN ('pending', 'in_progress', 'completed'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedule_events (
            id SERIAL PRIMARY KEY,
            title VARCHAR(100) NOT NULL,
            description TEXT,
            starts_at TIMESTAMPTZ NOT NULL,
            ends_at TIMESTAMPTZ NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            CONSTRAINT schedule_events_window_check CHECK (starts_at < ends_at)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mood_entries (
            id SERIAL PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            entry_date DATE NOT NULL DEFAULT CURRENT_DATE,
            mood VARCHAR(50) NOT NULL,
            comment TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tutoring_sessions (
            id SERIAL PRIMARY KEY,
            topic VARCHAR(100) NOT NULL,
            description TEXT,
            scheduled_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tutoring_participants (
            user_id INTEGER NOT NULL,
            session_id INTEGER NOT NULL,
            role VARCHAR(20) NOT NULL,
            PRIMARY KEY (user_id, session_id, role),
            CONSTRAINT tutoring_participants_user_fk FOREIGN KEY (user_id)
                REFERENCES users(id) ON DELETE CASCADE,
            CONSTRAINT tutoring_participants_session_fk FOREIGN KEY (session_id)
                REFERENCES tutoring_sessions(id) ON DELETE CASCADE,
            CONSTRAINT tutoring_participants_role_check
                CHECK (role IN ('tutor', 'student'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;
    seed_roles(pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_schedule_events_user ON schedule_events(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mood_entries_user ON mood_entries(user_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tutoring_participants_session ON tutoring_participants(session_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert the default roles when the table is empty.
async fn seed_roles(pool: &PgPool) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles")
        .fetch_one(&mut *tx)
        .await?;

    if existing > 0 {
        tracing::debug!(existing, "roles already present, skipping seed");
        return Ok(());
    }

    for (name, description) in DEFAULT_ROLES {
        sqlx::query("INSERT INTO roles (name, description) VALUES ($1, $2)")
            .bind(name)
            .bind(description)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!("Seeded default roles");
    Ok(())
}
