//! # Courier Dispatch
//!
//! Every prepared order gets a courier. The [`Dispatcher`] trait is the seam
//! between the kitchen and whoever sends couriers out:
//!
//! - [`DriverDispatcher`] is the real one. It picks a random arrival delay per
//!   courier and delivers a [`Driver`] to the arrival queue when the delay
//!   elapses, unless the courier was cancelled first.
//! - [`MockDispatcher`] records requests and cancellations for tests.

pub mod error;
pub mod mock;
pub mod service;

pub use error::*;
pub use mock::MockDispatcher;
pub use service::{ArrivalWindow, DispatchLoop, DriverDispatcher};

use crate::model::PreparedOrder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub Uuid);

impl DriverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DriverId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "driver-{}", self.0.simple())
    }
}

/// A courier on the way to pick up one order.
#[derive(Debug, Clone)]
pub struct Driver {
    pub id: DriverId,
    pub order: Arc<PreparedOrder>,
    pub arrival_delay: Duration,
}

impl Driver {
    pub fn new(order: Arc<PreparedOrder>, arrival_delay: Duration) -> Self {
        Self {
            id: DriverId::new(),
            order,
            arrival_delay,
        }
    }
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Sends a courier for `order`.
    async fn dispatch_driver(&self, order: Arc<PreparedOrder>) -> Result<(), DispatchError>;

    /// Calls off the courier for `order`, if one is still on the way.
    /// A courier that has already arrived is unaffected.
    fn cancel_driver_for_order(&self, order: &PreparedOrder);
}
