//! Legacy password upgrade
//!
//! Rows written before passwords were hashed hold plaintext. This hashes
//! each such value in place so those users can keep logging in with the
//! same password.

use anyhow::{Context, Result};
use clap::Parser;

use studydesk_server::auth::{hash_password, is_password_hash};
use studydesk_server::db::UserRepo;

use crate::config::DatabaseArgs;

/// Arguments for the rehash-passwords command
#[derive(Parser, Debug)]
pub struct RehashArgs {
    /// List affected users without writing anything
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

pub async fn run_rehash_passwords(args: RehashArgs) -> Result<()> {
    let pool = args.db.connect().await?;
    let repo = UserRepo::new(&pool);

    let legacy = repo
        .legacy_passwords()
        .await
        .context("Failed to list stored passwords")?;

    let mut updated = 0usize;
    for creds in legacy {
        // The prefix filter is coarse; skip anything that already parses
        if is_password_hash(&creds.password_hash) {
            continue;
        }

        if args.dry_run {
            println!("would rehash: {} (id {})", creds.email, creds.id);
            continue;
        }

        let hashed = hash_password(&creds.password_hash)?;
        repo.set_password(creds.id, &hashed)
            .await
            .with_context(|| format!("Failed to update password for user {}", creds.id))?;
        tracing::info!(user_id = creds.id, "password rehashed");
        updated += 1;
    }

    if !args.dry_run {
        println!("Rehashed {updated} password(s)");
    }
    Ok(())
}
