pub mod admin;
pub mod generator;
pub mod health;
pub mod leaderboard;
pub(crate) mod page;
pub mod referral;

pub use generator::{GeneratorService, generator_routes};
pub use health::{AppStartTime, HealthService, health_routes};
pub use leaderboard::{LeaderboardService, leaderboard_routes};
pub use referral::{ReferralService, ResolvedView, referral_routes, resolved_views};
