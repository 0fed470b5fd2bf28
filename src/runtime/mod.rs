//! Runtime module
//!
//! - `lifetime`: startup preparation and shutdown handling
//! - `modes`: server and batch command entry points

pub mod lifetime;
pub mod modes;
