mod aggregate_datapoints;
mod config_gen;
mod issue_token;
mod update_leaderboard;

pub use aggregate_datapoints::{aggregate_datapoints, cutoff_for};
pub use config_gen::config_generate;
pub use issue_token::issue_token;
pub use update_leaderboard::update_leaderboard;
