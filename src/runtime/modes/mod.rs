//! Mode routing
//!
//! This module provides unified entry points for the execution modes:
//! - Server mode (HTTP server)
//! - CLI mode (batch commands)

pub mod cli;
pub mod server;

pub use cli::run_cli;
pub use server::run_server;

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq)]
pub enum Mode {
    Server,
    Cli,
}

/// `serve` 或未指定子命令时为服务器模式，其余为批处理命令
pub fn detect_mode(cmd: &Commands) -> Mode {
    match cmd {
        Commands::Serve => Mode::Server,
        _ => Mode::Cli,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode(&Commands::Serve), Mode::Server);
        assert_eq!(
            detect_mode(&Commands::UpdateLeaderboard { quiet: false }),
            Mode::Cli
        );
    }
}
