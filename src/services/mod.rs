//! Service layer for business logic
//!
//! Logic shared between the HTTP API, middleware and CLI commands.

pub mod activity;
pub mod clock;
pub mod leaderboard;
pub mod links;

pub use activity::{FlashMessage, MessageLevel, MessageSink, notify_since_last_visit};
pub use clock::{Clock, FixedClock, SystemClock};
pub use leaderboard::{LINK_CLICKS_METRIC, LeaderboardReport, LeaderboardUpdater, compute_standings};
pub use links::{create_referral_link, referral_path, render_link_html};
