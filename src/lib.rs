//! Affiliates - banner generator, referral tracking and leaderboard
//!
//! Users pick a promotional banner, customize it and receive a referral link.
//! Clicks on those links are counted per day, summed into a leaderboard and
//! reported back to returning users.
//!
//! # Architecture
//! - `storage`: SeaORM storage backend and domain models
//! - `analytics`: buffered referral click counting
//! - `services`: leaderboard, referral links and activity summaries
//! - `api`: URL routing, middleware and HTTP handlers
//! - `interfaces`: batch CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging and panic hook

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
