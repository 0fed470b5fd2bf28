//! HTTP layer
//!
//! - `routing`: named route table with resolve / reverse
//! - `middleware`: session, flash messages, activity summary, referral skip
//! - `services`: generator, referral, leaderboard, health and admin handlers

pub mod constants;
pub mod jwt;
pub mod messages;
pub mod middleware;
pub mod routing;
pub mod services;
