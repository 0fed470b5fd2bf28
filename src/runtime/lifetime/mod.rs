//! Application lifecycle: startup preparation and graceful shutdown

pub mod shutdown;
pub mod startup;
