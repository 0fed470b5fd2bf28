//! `affiliates aggregate-datapoints [--days N]`

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStorage;

/// 保留最近 `days` 天（含今天往前数），更早的数据点被归档
pub fn cutoff_for(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

pub async fn aggregate_datapoints(storage: Arc<SeaOrmStorage>, days: u32) -> Result<(), CliError> {
    let cutoff = cutoff_for(Utc::now().date_naive(), days);
    println!(
        "{} {}",
        "Aggregating data points before".yellow(),
        cutoff.to_string().blue()
    );

    let folded = storage.aggregate_old_datapoints(cutoff).await?;
    println!(
        "{} {}",
        "Data points folded into link totals:".green(),
        folded.to_string().cyan()
    );
    Ok(())
}
