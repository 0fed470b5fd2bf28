pub mod admin_auth;
pub mod flash;
pub mod referral_skip;
pub mod request_id;
pub mod session;
pub mod stats_since_last_visit;

pub use admin_auth::AdminAuth;
pub use flash::FlashMessages;
pub use referral_skip::{DEFAULT_SKIP_VIEWS, ReferralSkip};
pub use request_id::{RequestId, RequestIdMiddleware};
pub use session::{CurrentUser, SessionMiddleware};
pub use stats_since_last_visit::StatsSinceLastVisit;
