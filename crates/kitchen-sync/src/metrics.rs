//! Running counters for a kitchen.
//!
//! Every stage holds an `Arc<KitchenStats>` and bumps its own counters. A
//! [`StatsSnapshot`] is logged at shutdown and returned to the caller.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct KitchenStats {
    orders_submitted: AtomicU64,
    orders_prepared: AtomicU64,
    drivers_dispatched: AtomicU64,
    drivers_cancelled: AtomicU64,
    orders_placed: AtomicU64,
    orders_moved: AtomicU64,
    orders_expired: AtomicU64,
    orders_discarded: AtomicU64,
    orders_fulfilled: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub orders_submitted: u64,
    pub orders_prepared: u64,
    pub drivers_dispatched: u64,
    pub drivers_cancelled: u64,
    pub orders_placed: u64,
    pub orders_moved: u64,
    pub orders_expired: u64,
    pub orders_discarded: u64,
    pub orders_fulfilled: u64,
}

impl KitchenStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_submitted(&self) {
        self.orders_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn order_prepared(&self) {
        self.orders_prepared.fetch_add(1, Ordering::Relaxed);
    }

    pub fn driver_dispatched(&self) {
        self.drivers_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn driver_cancelled(&self) {
        self.drivers_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn order_placed(&self) {
        self.orders_placed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn order_moved(&self) {
        self.orders_moved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn order_expired(&self) {
        self.orders_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn order_discarded(&self) {
        self.orders_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn order_fulfilled(&self) {
        self.orders_fulfilled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            orders_submitted: self.orders_submitted.load(Ordering::Relaxed),
            orders_prepared: self.orders_prepared.load(Ordering::Relaxed),
            drivers_dispatched: self.drivers_dispatched.load(Ordering::Relaxed),
            drivers_cancelled: self.drivers_cancelled.load(Ordering::Relaxed),
            orders_placed: self.orders_placed.load(Ordering::Relaxed),
            orders_moved: self.orders_moved.load(Ordering::Relaxed),
            orders_expired: self.orders_expired.load(Ordering::Relaxed),
            orders_discarded: self.orders_discarded.load(Ordering::Relaxed),
            orders_fulfilled: self.orders_fulfilled.load(Ordering::Relaxed),
        }
    }
}
