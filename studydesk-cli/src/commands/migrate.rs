//! Schema migration command

use anyhow::Result;
use clap::Parser;

use crate::config::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create tables and seed the default roles
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    args.db.connect_migrated().await?;
    println!("Database schema is up to date");
    Ok(())
}
