//! "Since your last visit" activity summary
//!
//! Runs once per authenticated request. A user is told about new clicks and
//! downloads at most once per `activity_message_min_days`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;
use crate::services::clock::Clock;
use crate::storage::{ActivitySummary, SeaOrmStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub message: String,
}

/// Destination for one-shot user notices
pub trait MessageSink {
    fn add(&mut self, level: MessageLevel, message: String);

    fn info(&mut self, message: String) {
        self.add(MessageLevel::Info, message);
    }
}

impl MessageSink for Vec<FlashMessage> {
    fn add(&mut self, level: MessageLevel, message: String) {
        self.push(FlashMessage { level, message });
    }
}

pub fn activity_message(summary: &ActivitySummary) -> String {
    format!(
        "Since your last visit, your links have been clicked {} times and helped {} people download Firefox.",
        summary.clicks, summary.downloads
    )
}

/// Check the user's activity since their last visit and record today's visit.
///
/// Returns the summary when one was computed, `None` when the request was a
/// no-op (no profile, first visit, or too soon since the last one).
pub async fn notify_since_last_visit(
    storage: &SeaOrmStorage,
    clock: &dyn Clock,
    min_days: i64,
    user_id: i64,
    messages: &mut dyn MessageSink,
) -> Result<Option<ActivitySummary>> {
    let Some(profile) = storage.get_profile(user_id).await? else {
        return Ok(None);
    };

    let today = clock.today();
    let Some(last_visit) = profile.last_visit else {
        storage.set_last_visit(user_id, today).await?;
        return Ok(None);
    };

    if (today - last_visit).num_days() < min_days {
        return Ok(None);
    }

    let summary = storage.activity_between(user_id, last_visit, today).await?;
    storage.set_last_visit(user_id, today).await?;
    debug!(
        "User {} activity since {}: {} clicks, {} downloads",
        user_id, last_visit, summary.clicks, summary.downloads
    );

    if !summary.is_empty() {
        messages.info(activity_message(&summary));
    }
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_contains_both_counts() {
        let msg = activity_message(&ActivitySummary {
            clicks: 5,
            downloads: 9,
        });
        assert!(msg.contains('5') && msg.contains('9'));
    }

    #[test]
    fn test_vec_sink_collects_info() {
        let mut sink: Vec<FlashMessage> = Vec::new();
        sink.info("hello".to_string());
        assert_eq!(sink[0].level, MessageLevel::Info);
        assert_eq!(sink[0].message, "hello");
    }
}
