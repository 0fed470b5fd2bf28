//! ClickSink implementation for SeaOrmStorage
//!
//! Buffered referral clicks land on today's data point of each link.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::SeaOrmStorage;
use crate::analytics::ClickSink;

#[async_trait]
impl ClickSink for SeaOrmStorage {
    async fn flush_clicks(&self, updates: Vec<(i64, usize)>) -> anyhow::Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let today = Utc::now().date_naive();
        self.record_link_clicks(&updates, today)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to record link clicks: {}", e))?;

        debug!(
            "Click counts flushed to {} database ({} links)",
            self.backend_name.to_uppercase(),
            updates.len()
        );
        Ok(())
    }
}
