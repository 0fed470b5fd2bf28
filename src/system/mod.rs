//! System-level modules
//!
//! - Logging initialization
//! - Panic hook

pub mod logging;
pub mod panic_handler;
