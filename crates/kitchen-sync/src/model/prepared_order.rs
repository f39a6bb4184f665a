//! Orders that have left the kitchen and are losing value.
//!
//! Value is tracked incrementally. Each order remembers the value it had at its
//! last measurement and when that was; the current value is the decay formula
//! applied to the remembered value over the whole seconds elapsed since.
//! Relocating an order re-bases that pair, so time spent on the overflow shelf
//! (where decay runs at twice the rate) is charged at the overflow rate and time
//! afterwards at the normal rate.
//!
//! Re-basing moves the measurement forward by exactly the whole seconds it
//! charged. A partial second carries over into the next measurement instead of
//! being dropped.

use crate::expression;
use crate::model::{Order, OrderId, OrderStatus, Temperature};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::error;

#[derive(Debug, Clone, Copy)]
struct DecayState {
    value_at_last_measured: f64,
    last_measured: Instant,
}

/// A prepared order waiting on a shelf.
///
/// Everything except the decay state is fixed at preparation time. The decay
/// state is guarded so that a relocation and a concurrent reader never see a
/// value paired with the wrong timestamp.
#[derive(Debug)]
pub struct PreparedOrder {
    order: Order,
    decay: Mutex<DecayState>,
}

impl PreparedOrder {
    /// Marks `order` as prepared now, at full value.
    pub fn new(order: Order) -> Self {
        Self::prepared_at(order, Instant::now())
    }

    pub fn prepared_at(order: Order, at: Instant) -> Self {
        let value = f64::from(order.shelf_life());
        Self {
            order,
            decay: Mutex::new(DecayState {
                value_at_last_measured: value,
                last_measured: at,
            }),
        }
    }

    pub fn id(&self) -> OrderId {
        self.order.id()
    }

    pub fn name(&self) -> &str {
        self.order.name()
    }

    pub fn temperature(&self) -> Temperature {
        self.order.temperature()
    }

    pub fn shelf_life(&self) -> u32 {
        self.order.shelf_life()
    }

    pub fn decay_rate(&self) -> f64 {
        self.order.decay_rate()
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn value_at_last_measured(&self) -> f64 {
        self.decay.lock().value_at_last_measured
    }

    pub fn last_measured(&self) -> Instant {
        self.decay.lock().last_measured
    }

    /// Value after `order_age` more seconds on a shelf, starting from the value
    /// at the last measurement.
    ///
    /// Never negative. A formula that fails to evaluate yields `0.0`, which
    /// makes the order expire on the next sweep.
    pub fn value_after(&self, order_age: u64, in_overflow: bool) -> f64 {
        let from = self.value_at_last_measured();
        self.decayed_value(from, order_age, in_overflow)
    }

    /// Current value, assuming the order has been where `in_overflow` says since
    /// the last measurement.
    pub fn value_now(&self, in_overflow: bool) -> f64 {
        self.value_at(Instant::now(), in_overflow)
    }

    pub fn value_at(&self, at: Instant, in_overflow: bool) -> f64 {
        let state = *self.decay.lock();
        let age = whole_seconds_between(state.last_measured, at);
        self.decayed_value(state.value_at_last_measured, age, in_overflow)
    }

    /// Re-bases the decay state at `at`.
    ///
    /// `was_in_overflow` describes where the order spent the time since the
    /// previous measurement. Returns the new value.
    pub fn compute_and_assign_value(&self, at: Instant, was_in_overflow: bool) -> f64 {
        let mut state = self.decay.lock();
        let age = whole_seconds_between(state.last_measured, at);
        let value = self.decayed_value(state.value_at_last_measured, age, was_in_overflow);
        state.value_at_last_measured = value;
        state.last_measured += Duration::from_secs(age);
        value
    }

    pub fn is_expired(&self, in_overflow: bool) -> bool {
        self.value_now(in_overflow) <= 0.0
    }

    /// A point-in-time status for reporting.
    pub fn status(&self, shelf: &str, in_overflow: bool) -> OrderStatus {
        let value = self.value_now(in_overflow);
        let normalized_value = match self.shelf_life() {
            0 => 0.0,
            shelf_life => value / f64::from(shelf_life),
        };
        OrderStatus {
            id: self.id(),
            name: self.name().to_string(),
            shelf: shelf.to_string(),
            temp: self.temperature(),
            value,
            normalized_value,
        }
    }

    fn decayed_value(&self, from: f64, order_age: u64, in_overflow: bool) -> f64 {
        let rate = if in_overflow {
            2.0 * self.decay_rate()
        } else {
            self.decay_rate()
        };
        match expression::evaluate(self.order.decay_formula(), from, rate, order_age) {
            Ok(value) if value > 0.0 => value,
            Ok(_) => 0.0,
            Err(e) => {
                error!(
                    order_id = %self.id(),
                    formula = self.order.decay_formula(),
                    error = %e,
                    "Decay formula failed to evaluate"
                );
                0.0
            }
        }
    }
}

fn whole_seconds_between(earlier: Instant, later: Instant) -> u64 {
    later.saturating_duration_since(earlier).as_secs()
}
