//! CLI mode
//!
//! Batch commands run to completion and exit; they never start the HTTP server.

use crate::cli::Commands;
use crate::interfaces::cli::{CliError, run_cli_command};

/// Run one batch command
pub async fn run_cli(cmd: &Commands) -> Result<(), CliError> {
    run_cli_command(cmd).await
}
