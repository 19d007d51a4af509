//! HTTP server command

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use studydesk_server::auth::AuthConfig;
use studydesk_server::http::{run_server, ServerConfig, DEFAULT_BIND};

use crate::config::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "STUDYDESK_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Skip creating tables and seeding roles on startup
    #[arg(long)]
    pub no_migrate: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let pool = if args.no_migrate {
        args.db.connect().await?
    } else {
        args.db.connect_migrated().await?
    };

    let auth = AuthConfig::from_env();
    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    tracing::info!("Starting studydesk server on {}", args.bind);

    // Blocks until shutdown
    run_server(pool, config, &auth)
        .await
        .context("Server error")?;

    Ok(())
}
