//! Leaderboard regeneration
//!
//! Ranks every user by total referral clicks (archived link totals plus daily
//! data points) and replaces the standings table with the result.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::storage::{SeaOrmStorage, Standing, UserClickTotal};

pub const LINK_CLICKS_METRIC: &str = "link_clicks";

/// Merge both per-user sums and rank them.
///
/// Users missing from either side, or with a NULL sum, count as zero on that
/// side. Highest total ranks first; equal totals keep ascending user id order.
pub fn compute_standings(
    link_totals: &[UserClickTotal],
    datapoint_totals: &[UserClickTotal],
) -> Vec<Standing> {
    let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
    for entry in link_totals.iter().chain(datapoint_totals) {
        *totals.entry(entry.user_id).or_insert(0) += entry.clicks.unwrap_or(0);
    }

    let mut ranked: Vec<(i64, i64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, (user_id, value))| Standing {
            ranking: (index + 1) as i32,
            user_id,
            metric: LINK_CLICKS_METRIC.to_string(),
            value,
        })
        .collect()
}

/// Outcome of one regeneration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardReport {
    pub removed: u64,
    pub inserted: usize,
}

pub struct LeaderboardUpdater {
    storage: Arc<SeaOrmStorage>,
    batch_size: usize,
    quiet: bool,
}

impl LeaderboardUpdater {
    pub fn new(storage: Arc<SeaOrmStorage>, batch_size: usize) -> Self {
        Self {
            storage,
            batch_size,
            quiet: false,
        }
    }

    /// Suppress the progress lines on stdout
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn output(&self, line: &str) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    /// Recompute and replace all standings.
    ///
    /// The table is empty between the delete and the last insert batch. Any
    /// error aborts the run as-is.
    pub async fn run(&self) -> Result<LeaderboardReport> {
        self.output("Collecting click counts...");
        let link_totals = self.storage.click_totals_from_links().await?;
        let datapoint_totals = self.storage.click_totals_from_datapoints().await?;

        self.output("Sorting click counts...");
        let standings = compute_standings(&link_totals, &datapoint_totals);

        self.output("Updating database...");
        let removed = self.storage.clear_leaderboard().await?;
        for standing in &standings {
            debug!(
                "{}: {} {}",
                standing.ranking, standing.user_id, standing.value
            );
        }
        self.storage
            .insert_standings(&standings, self.batch_size)
            .await?;

        self.output("Done!");
        info!(
            "Leaderboard regenerated: {} standings (replaced {})",
            standings.len(),
            removed
        );
        Ok(LeaderboardReport {
            removed,
            inserted: standings.len(),
        })
    }
}

/// Regenerate the leaderboard every `interval` inside the server process
pub fn spawn_leaderboard_schedule(
    storage: Arc<SeaOrmStorage>,
    batch_size: usize,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let updater = LeaderboardUpdater::new(storage, batch_size).quiet(true);
        let mut ticker = tokio::time::interval(interval);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = updater.run().await {
                error!("Scheduled leaderboard update failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(user_id: i64, clicks: Option<i64>) -> UserClickTotal {
        UserClickTotal { user_id, clicks }
    }

    #[test]
    fn test_combines_both_sources() {
        let links = [total(1, Some(5)), total(2, None), total(3, Some(1))];
        let points = [total(1, Some(2)), total(2, Some(10)), total(3, None)];

        let standings = compute_standings(&links, &points);
        let got: Vec<(i32, i64, i64)> = standings
            .iter()
            .map(|s| (s.ranking, s.user_id, s.value))
            .collect();
        assert_eq!(got, vec![(1, 2, 10), (2, 1, 7), (3, 3, 1)]);
        assert!(standings.iter().all(|s| s.metric == "link_clicks"));
    }

    #[test]
    fn test_user_missing_from_one_side_counts_zero() {
        let standings = compute_standings(&[total(4, Some(3))], &[total(9, Some(8))]);
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].user_id, 9);
        assert_eq!(standings[1].value, 3);
    }

    #[test]
    fn test_ties_keep_user_id_order() {
        let standings = compute_standings(
            &[total(30, Some(0)), total(10, None), total(20, Some(4))],
            &[],
        );
        let order: Vec<i64> = standings.iter().map(|s| s.user_id).collect();
        assert_eq!(order, vec![20, 10, 30]);
        let ranks: Vec<i32> = standings.iter().map(|s| s.ranking).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_standings(&[], &[]).is_empty());
    }
}
