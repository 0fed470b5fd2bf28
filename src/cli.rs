//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for affiliates using clap's derive macros.

use clap::{Parser, Subcommand};

/// Affiliates - banner generator, referral tracking and leaderboard
#[derive(Parser)]
#[command(name = "affiliates")]
#[command(version)]
#[command(about = "Affiliate banner service", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the HTTP server (default when no command is given)
    Serve,

    /// Regenerate the leaderboard from link clicks and data points
    UpdateLeaderboard {
        /// Suppress progress output
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Fold data points older than N days into the link aggregates
    AggregateDatapoints {
        /// Keep data points from the last N days
        #[arg(long, default_value_t = 90)]
        days: u32,
    },

    /// Issue a session token for a user
    IssueToken {
        /// User id
        user_id: i64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 未指定子命令时运行服务器
    pub fn command_or_serve(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs_server() {
        let cli = Cli::try_parse_from(["affiliates"]).unwrap();
        assert_eq!(cli.command_or_serve(), &Commands::Serve);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_update_leaderboard_quiet() {
        let cli =
            Cli::try_parse_from(["affiliates", "--config", "prod.toml", "update-leaderboard", "--quiet"])
                .unwrap();
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::UpdateLeaderboard { quiet: true })
        );
    }

    #[test]
    fn test_aggregate_days_default() {
        let cli = Cli::try_parse_from(["affiliates", "aggregate-datapoints"]).unwrap();
        assert_eq!(cli.command, Some(Commands::AggregateDatapoints { days: 90 }));
    }

    #[test]
    fn test_issue_token_requires_numeric_id() {
        assert!(Cli::try_parse_from(["affiliates", "issue-token", "bob"]).is_err());
        let cli = Cli::try_parse_from(["affiliates", "issue-token", "7"]).unwrap();
        assert_eq!(cli.command, Some(Commands::IssueToken { user_id: 7 }));
    }

    #[test]
    fn test_config_generate() {
        let cli =
            Cli::try_parse_from(["affiliates", "config", "generate", "out.toml", "--force"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Generate {
                    output_path: Some("out.toml".to_string()),
                    force: true,
                }
            })
        );
    }
}
