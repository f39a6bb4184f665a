//! Configuration and the wiring that turns it into a running kitchen.

pub mod config;
pub mod kitchen_system;

pub use config::*;
pub use kitchen_system::*;
