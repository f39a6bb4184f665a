//! # Shelves
//!
//! A [`Shelf`] is a bounded holding area keyed by order id. It knows nothing
//! about couriers or events; it only stores, removes and sweeps out expired
//! orders. Every method takes `&self` and locks internally, so a shelf can be
//! shared freely between the placement, removal and housekeeping paths.

use crate::model::{OrderId, PreparedOrder, ShelfStatus, Temperature};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

/// The four holding areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShelfKind {
    Hot,
    Cold,
    Frozen,
    Overflow,
}

impl ShelfKind {
    pub const ALL: [ShelfKind; 4] = [
        ShelfKind::Hot,
        ShelfKind::Cold,
        ShelfKind::Frozen,
        ShelfKind::Overflow,
    ];

    /// The home shelf for a temperature.
    pub fn for_temperature(temperature: Temperature) -> Self {
        match temperature {
            Temperature::Hot => ShelfKind::Hot,
            Temperature::Cold => ShelfKind::Cold,
            Temperature::Frozen => ShelfKind::Frozen,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShelfKind::Hot => "hot",
            ShelfKind::Cold => "cold",
            ShelfKind::Frozen => "frozen",
            ShelfKind::Overflow => "overflow",
        }
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, ShelfKind::Overflow)
    }
}

impl Display for ShelfKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A bounded, thread-safe holding area.
#[derive(Debug)]
pub struct Shelf {
    kind: ShelfKind,
    capacity: usize,
    orders: Mutex<HashMap<OrderId, Arc<PreparedOrder>>>,
}

impl Shelf {
    pub fn new(kind: ShelfKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            orders: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }

    pub fn kind(&self) -> ShelfKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.orders.lock().len()
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.capacity
    }

    /// Stores `order` if there is room. Returns whether it was stored.
    #[must_use]
    pub fn put(&self, order: Arc<PreparedOrder>) -> bool {
        let mut orders = self.orders.lock();
        if orders.len() >= self.capacity && !orders.contains_key(&order.id()) {
            return false;
        }
        orders.insert(order.id(), order);
        true
    }

    /// Removes exactly this order. An unrelated order that happens to share
    /// the id is left alone.
    pub fn remove(&self, order: &Arc<PreparedOrder>) -> bool {
        let mut orders = self.orders.lock();
        match orders.get(&order.id()) {
            Some(stored) if Arc::ptr_eq(stored, order) => {
                orders.remove(&order.id());
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &OrderId) -> Option<Arc<PreparedOrder>> {
        self.orders.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &OrderId) -> bool {
        self.orders.lock().contains_key(id)
    }

    /// A snapshot of the stored orders.
    pub fn all(&self) -> Vec<Arc<PreparedOrder>> {
        self.orders.lock().values().cloned().collect()
    }

    /// Removes and returns every order whose value has reached zero.
    ///
    /// Orders on the overflow shelf are valued at the overflow decay rate.
    pub fn sweep(&self) -> Vec<Arc<PreparedOrder>> {
        let in_overflow = self.kind.is_overflow();
        let mut orders = self.orders.lock();
        let expired: Vec<OrderId> = orders
            .iter()
            .filter(|(_, order)| order.is_expired(in_overflow))
            .map(|(id, _)| *id)
            .collect();
        expired
            .iter()
            .filter_map(|id| orders.remove(id))
            .collect()
    }

    /// Current statuses of the stored orders.
    pub fn status(&self) -> ShelfStatus {
        let in_overflow = self.kind.is_overflow();
        let statuses = self
            .all()
            .iter()
            .map(|order| order.status(self.name(), in_overflow))
            .collect();
        ShelfStatus::new(self.name(), statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Order;
    use proptest::prelude::*;
    use std::time::Duration;

    fn prepared(name: &str, temp: &str, shelf_life: i64, decay_rate: f64) -> Arc<PreparedOrder> {
        Arc::new(PreparedOrder::new(
            Order::new(name, temp, shelf_life, decay_rate).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_put_respects_capacity() {
        let shelf = Shelf::new(ShelfKind::Hot, 2);
        assert!(shelf.put(prepared("A", "hot", 100, 0.1)));
        assert!(shelf.put(prepared("B", "hot", 100, 0.1)));
        assert!(shelf.is_full());
        assert!(!shelf.put(prepared("C", "hot", 100, 0.1)));
        assert_eq!(shelf.size(), 2);
    }

    #[tokio::test]
    async fn test_remove_only_matches_same_order() {
        let shelf = Shelf::new(ShelfKind::Cold, 2);
        let order = prepared("A", "cold", 100, 0.1);
        assert!(shelf.put(order.clone()));

        let lookalike = Arc::new(PreparedOrder::new(order.order().clone()));
        assert!(!shelf.remove(&lookalike));
        assert!(shelf.remove(&order));
        assert!(!shelf.remove(&order));
        assert_eq!(shelf.size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let shelf = Shelf::new(ShelfKind::Frozen, 5);
        let short = prepared("Short", "frozen", 2, 0.0);
        let long = prepared("Long", "frozen", 100, 0.0);
        assert!(shelf.put(short.clone()));
        assert!(shelf.put(long.clone()));

        assert!(shelf.sweep().is_empty());

        tokio::time::advance(Duration::from_secs(2)).await;
        let swept = shelf.sweep();
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].id(), short.id());
        assert!(shelf.contains(&long.id()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_sweep_uses_double_rate() {
        let overflow = Shelf::new(ShelfKind::Overflow, 5);
        let home = Shelf::new(ShelfKind::Hot, 5);
        // 10 - (1 + 2*2)*2 == 0 on overflow, 10 - (1 + 2)*2 == 4 at home.
        assert!(overflow.put(prepared("A", "hot", 10, 2.0)));
        assert!(home.put(prepared("B", "hot", 10, 2.0)));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(overflow.sweep().len(), 1);
        assert!(home.sweep().is_empty());
    }

    #[tokio::test]
    async fn test_status_sorted_by_name() {
        let shelf = Shelf::new(ShelfKind::Hot, 3);
        assert!(shelf.put(prepared("Tacos", "hot", 100, 0.1)));
        assert!(shelf.put(prepared("Arepas", "hot", 100, 0.1)));
        let status = shelf.status();
        assert_eq!(status.shelf_name, "hot");
        assert_eq!(status.order_statuses[0].name, "Arepas");
        assert_eq!(status.order_statuses[1].name, "Tacos");
    }

    proptest! {
        #[test]
        fn test_size_never_exceeds_capacity(capacity in 0usize..8, puts in 0usize..20, removes in 0usize..20) {
            let shelf = Shelf::new(ShelfKind::Overflow, capacity);
            let mut stored = Vec::new();
            for i in 0..puts {
                let order = prepared(&format!("order-{i}"), "hot", 1000, 0.0);
                if shelf.put(order.clone()) {
                    stored.push(order);
                }
                prop_assert!(shelf.size() <= capacity);
            }
            for order in stored.iter().take(removes) {
                prop_assert!(shelf.remove(order));
                prop_assert!(shelf.size() <= capacity);
            }
            prop_assert_eq!(shelf.size(), stored.len().saturating_sub(removes));
        }
    }
}
