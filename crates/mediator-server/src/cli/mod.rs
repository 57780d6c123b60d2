// crates/mediator-server/src/cli/mod.rs
// CLI module for Mediator commands

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mediator::{ChatTurn, DispatchContext, Stage};
use std::io::Read;
use std::path::{Path, PathBuf};

pub mod config;
pub mod dispatch;
pub mod parse;

pub use config::run_config;
pub use dispatch::{run_dispatch, run_turn};
pub use parse::run_parse;

#[derive(Parser)]
#[command(name = "mediator")]
#[command(about = "Micro-tag response parsing and off-ramp dispatch for guided mediation")]
#[command(version)]
pub struct Cli {
    /// Log at debug level (overrides MEDIATOR_LOG_LEVEL)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse raw model output and print the result as JSON
    Parse {
        /// Read from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Resolve an off-ramp signal and print the reply
    Dispatch {
        /// Signal token, e.g. EXPLAIN_PROCESS
        #[arg(index = 1)]
        signal: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Parse raw model output, resolve any off-ramp, and print the turn outcome
    Turn {
        /// Read from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show configuration and validation report
    Config,
}

/// Conversation context shared by `dispatch` and `turn`
#[derive(Args, Debug)]
pub struct ContextArgs {
    /// The user's current message
    #[arg(short, long)]
    pub message: String,

    /// JSON file with prior turns: [{"role": "user", "content": "..."}]
    #[arg(long)]
    pub history: Option<PathBuf>,

    #[arg(long)]
    pub user_name: Option<String>,

    #[arg(long)]
    pub partner_name: Option<String>,

    /// Current stage (onboarding, witness, perspective-stretch, need-mapping, strategic-repair)
    #[arg(long, value_parser = parse_stage)]
    pub stage: Option<Stage>,

    #[arg(long, default_value = "cli")]
    pub session_id: String,

    /// Defaults to a fresh UUID
    #[arg(long)]
    pub turn_id: Option<String>,

    /// Never call an LLM provider; use static replies
    #[arg(long)]
    pub offline: bool,
}

impl ContextArgs {
    pub fn into_context(self) -> Result<DispatchContext> {
        let history = match self.history {
            Some(ref path) => load_history(path)?,
            None => Vec::new(),
        };
        Ok(DispatchContext {
            user_message: self.message,
            history,
            user_name: self.user_name,
            partner_name: self.partner_name,
            session_id: self.session_id,
            turn_id: self
                .turn_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            stage: self.stage,
        })
    }
}

fn parse_stage(value: &str) -> std::result::Result<Stage, String> {
    match value.trim().to_lowercase().replace('-', "_").as_str() {
        "onboarding" => Ok(Stage::Onboarding),
        "witness" => Ok(Stage::Witness),
        "perspective_stretch" => Ok(Stage::PerspectiveStretch),
        "need_mapping" => Ok(Stage::NeedMapping),
        "strategic_repair" => Ok(Stage::StrategicRepair),
        other => Err(format!("unknown stage '{}'", other)),
    }
}

/// Read raw model output from a file, or stdin when no file is given
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn load_history(path: &Path) -> Result<Vec<ChatTurn>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid history JSON in {}", path.display()))
}
