//! Environment and connection settings shared by subcommands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use studydesk_server::db::{create_pool, migrations, PgPool};

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.studydesk/.env
///
/// Runs before tracing is initialized, so the sources are returned for
/// logging instead of logged here.
pub fn load_dotenv() -> Vec<String> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(format!("current directory ({})", path.display()));
    }

    // dotenvy doesn't overwrite existing vars, so the cwd file wins
    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded_from.push(format!("~/.studydesk/.env ({})", env_file.display()));
        }
    }

    loaded_from
}

/// The studydesk config directory (~/.studydesk)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".studydesk"))
}

/// Database connection flag shared by every database-backed command
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (overrides .env files)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

impl DatabaseArgs {
    /// Connect, failing with a hint when no URL was given.
    pub async fn connect(&self) -> Result<PgPool> {
        let url = self.database_url.as_deref().context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.studydesk/.env",
        )?;

        create_pool(url)
            .await
            .context("Failed to create database pool")
    }

    /// Connect and bring the schema up to date.
    pub async fn connect_migrated(&self) -> Result<PgPool> {
        let pool = self.connect().await?;
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
        Ok(pool)
    }
}
