// crates/mediator-server/src/main.rs
// Mediator CLI - parse model replies and resolve off-ramps

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use mediator::config::EnvConfig;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Global .env first, then the working directory's
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".mediator/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let env = EnvConfig::load();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        env.log_level
            .as_deref()
            .and_then(|level| Level::from_str(level).ok())
            .unwrap_or(Level::WARN)
    };

    // stdout carries command output; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Parse { file } => cli::run_parse(file)?,
        Commands::Dispatch { signal, context } => cli::run_dispatch(&env, signal, context).await?,
        Commands::Turn { file, context } => cli::run_turn(&env, file, context).await?,
        Commands::Config => cli::run_config(&env)?,
    }

    Ok(())
}
