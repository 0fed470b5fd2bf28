//! CLI interface module
//!
//! Batch commands that run once and exit: leaderboard regeneration, data point
//! aggregation, session tokens and config generation.

pub mod commands;

use crate::cli::{Commands, ConfigCommands};
use crate::storage::StorageFactory;
use commands::{aggregate_datapoints, config_generate, issue_token, update_leaderboard};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::AffiliatesError> for CliError {
    fn from(err: crate::errors::AffiliatesError) -> Self {
        CliError::StorageError(err.to_string())
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: &Commands) -> Result<(), CliError> {
    // Generate doesn't need DB connection
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path.clone(), *force).await;
    }

    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;

    match cmd {
        Commands::UpdateLeaderboard { quiet } => update_leaderboard(storage, *quiet).await,
        Commands::AggregateDatapoints { days } => aggregate_datapoints(storage, *days).await,
        Commands::IssueToken { user_id } => issue_token(storage, *user_id).await,
        Commands::Serve | Commands::Config { .. } => Err(CliError::CommandError(
            "command is not a batch command".to_string(),
        )),
    }
}
