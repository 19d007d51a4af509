//! studydesk CLI - server and administration for the studydesk backend
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: create tables and seed roles
//! - `create-admin`: bootstrap an administrator account
//! - `rehash-passwords`: hash legacy plaintext passwords in place
//! - `completions`: shell completion scripts

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "studydesk",
    author,
    version,
    about = "Student productivity backend: tasks, schedule, moods and tutoring sessions",
    long_about = "Run and administer the studydesk HTTP API. Configuration comes from flags, \
                  environment variables, ./.env and ~/.studydesk/.env (in that order)."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create tables and seed the default roles
    Migrate(commands::migrate::MigrateArgs),
    /// Create an administrator account
    CreateAdmin(commands::admin::CreateAdminArgs),
    /// Hash any stored passwords that are still plaintext
    RehashPasswords(commands::rehash::RehashArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so `env = ...` flags see .env values
    let env_sources = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    if env_sources.is_empty() {
        tracing::debug!("No .env files found (current dir or ~/.studydesk)");
    } else {
        tracing::debug!("Loaded configuration from: {}", env_sources.join(", "));
    }

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
        Commands::CreateAdmin(args) => commands::run_create_admin(args).await,
        Commands::RehashPasswords(args) => commands::run_rehash_passwords(args).await,
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
