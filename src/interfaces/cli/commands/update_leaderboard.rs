//! `affiliates update-leaderboard [--quiet]`

use std::sync::Arc;

use colored::Colorize;

use crate::config::get_config;
use crate::interfaces::cli::CliError;
use crate::services::LeaderboardUpdater;
use crate::storage::SeaOrmStorage;

pub async fn update_leaderboard(storage: Arc<SeaOrmStorage>, quiet: bool) -> Result<(), CliError> {
    let batch_size = get_config().leaderboard.batch_size;
    let report = LeaderboardUpdater::new(storage, batch_size)
        .quiet(quiet)
        .run()
        .await?;

    if !quiet {
        println!(
            "{} {} standings ({} replaced)",
            "Leaderboard updated:".green(),
            report.inserted.to_string().cyan(),
            report.removed
        );
    }
    Ok(())
}
