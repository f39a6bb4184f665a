//! Handles for code outside the kitchen.

pub mod kitchen_client;

pub use kitchen_client::*;
