//! Administrator bootstrap
//!
//! The HTTP API only lets administrators create accounts, so the first
//! one has to come from here.

use anyhow::{Context, Result};
use clap::Parser;

use studydesk_server::auth::hash_password;
use studydesk_server::db::{NewUser, UserRepo};
use studydesk_server::models::{Email, NewPassword, PersonName};
use studydesk_server::policy::ADMIN_ROLE_ID;

use crate::config::DatabaseArgs;

/// Arguments for the create-admin command
#[derive(Parser, Debug)]
pub struct CreateAdminArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Login email
    #[arg(long)]
    pub email: String,

    /// Initial password (at least 6 characters)
    #[arg(long, env = "STUDYDESK_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create a user holding the administrator role
pub async fn run_create_admin(args: CreateAdminArgs) -> Result<()> {
    let name = PersonName::new(&args.name)?;
    let email = Email::new(&args.email)?;
    let password = NewPassword::new(&args.password)?;

    let pool = args.db.connect_migrated().await?;

    let user = UserRepo::new(&pool)
        .create(NewUser {
            name,
            email,
            password_hash: hash_password(password.expose())?,
            role_id: Some(ADMIN_ROLE_ID),
        })
        .await
        .context("Failed to create administrator")?;

    println!("Created administrator {} <{}> (id {})", user.name, user.email, user.id);
    Ok(())
}
