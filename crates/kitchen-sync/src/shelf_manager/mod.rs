//! # Shelf Manager
//!
//! Owns the hot, cold and frozen shelves plus the shared overflow shelf, and is
//! the only thing that moves orders between them.
//!
//! ## Paths through the manager
//!
//! 1. **Placement** - a prepared order goes to its home shelf, else overflow,
//!    else it is discarded and its courier called off.
//! 2. **Pickup** - an arrived courier takes its order from wherever it is.
//! 3. **Housekeeping** - on every tick each shelf is swept of expired orders,
//!    and orders on overflow whose home shelf has room are moved back home.
//!
//! Each shelf locks itself for single operations. Sweeps additionally hold a
//! per-shelf sweep guard so that two sweeps of one shelf never overlap, and
//! pickups hold the overflow guard so that a pickup never races a move out of
//! overflow.

pub mod sink;

pub use sink::*;

use crate::dispatch::{Dispatcher, Driver};
use crate::metrics::KitchenStats;
use crate::model::{OrderStatus, PreparedOrder, ShelfStatus, StatusEvent, Temperature};
use crate::shelf::{Shelf, ShelfKind};
use async_trait::async_trait;
use kitchen_framework::{Ticker, Worker, WorkerPool};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShelfCapacities {
    pub hot: usize,
    pub cold: usize,
    pub frozen: usize,
    pub overflow: usize,
}

impl Default for ShelfCapacities {
    fn default() -> Self {
        Self {
            hot: 15,
            cold: 15,
            frozen: 15,
            overflow: 20,
        }
    }
}

/// Timing of the housekeeping ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Housekeeping {
    pub period: Duration,
    pub initial_delay: Duration,
}

impl Default for Housekeeping {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(1000),
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Where a prepared order ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Shelved(ShelfKind),
    Discarded(DiscardReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The order had no value left when it reached the shelves.
    ExpiredOnArrival,
    /// Home and overflow were both full.
    NoRoom,
}

/// Handles of the manager's background tasks.
pub struct ManagerTasks {
    pub placement: Vec<JoinHandle<()>>,
    pub pickup: Vec<JoinHandle<()>>,
    pub housekeeping: JoinHandle<()>,
}

struct Area {
    shelf: Shelf,
    sweep: Mutex<()>,
}

impl Area {
    fn new(kind: ShelfKind, capacity: usize) -> Self {
        Self {
            shelf: Shelf::new(kind, capacity),
            sweep: Mutex::new(()),
        }
    }

    fn status_of(&self, order: &PreparedOrder) -> OrderStatus {
        order.status(self.shelf.name(), self.shelf.kind().is_overflow())
    }
}

pub struct ShelfManager {
    hot: Area,
    cold: Area,
    frozen: Area,
    overflow: Area,
    dispatcher: Arc<dyn Dispatcher>,
    sink: Arc<dyn StatusSink>,
    stats: Arc<KitchenStats>,
}

impl ShelfManager {
    pub fn new(
        capacities: ShelfCapacities,
        dispatcher: Arc<dyn Dispatcher>,
        sink: Arc<dyn StatusSink>,
        stats: Arc<KitchenStats>,
    ) -> Self {
        Self {
            hot: Area::new(ShelfKind::Hot, capacities.hot),
            cold: Area::new(ShelfKind::Cold, capacities.cold),
            frozen: Area::new(ShelfKind::Frozen, capacities.frozen),
            overflow: Area::new(ShelfKind::Overflow, capacities.overflow),
            dispatcher,
            sink,
            stats,
        }
    }

    /// Spawns the placement loop, the pickup loop and the housekeeping ticker.
    ///
    /// The two loops also stop once their queues close, so the placement loop
    /// can be drained before `shutdown` is cancelled.
    pub fn initialize(
        self: &Arc<Self>,
        placements: mpsc::Receiver<Arc<PreparedOrder>>,
        arrivals: mpsc::Receiver<Driver>,
        housekeeping: Housekeeping,
        shutdown: CancellationToken,
    ) -> ManagerTasks {
        let placement =
            WorkerPool::new("placement", 1).spawn(placements, self.clone(), shutdown.clone());
        let pickup = WorkerPool::new("pickup", 1).spawn(arrivals, self.clone(), shutdown.clone());

        let manager = self.clone();
        let housekeeping = Ticker::new(
            "housekeeping",
            housekeeping.period,
            housekeeping.initial_delay,
        )
        .spawn(shutdown, move || {
            let manager = manager.clone();
            async move {
                manager.housekeeping();
            }
        });

        ManagerTasks {
            placement,
            pickup,
            housekeeping,
        }
    }

    pub fn shelf(&self, kind: ShelfKind) -> &Shelf {
        &self.area(kind).shelf
    }

    /// Total number of orders on all shelves.
    pub fn order_count(&self) -> usize {
        ShelfKind::ALL.iter().map(|kind| self.shelf(*kind).size()).sum()
    }

    fn area(&self, kind: ShelfKind) -> &Area {
        match kind {
            ShelfKind::Hot => &self.hot,
            ShelfKind::Cold => &self.cold,
            ShelfKind::Frozen => &self.frozen,
            ShelfKind::Overflow => &self.overflow,
        }
    }

    fn home_area(&self, temperature: Temperature) -> &Area {
        self.area(ShelfKind::for_temperature(temperature))
    }

    /// Puts a freshly prepared order on its home shelf, or on overflow when
    /// home is full.
    ///
    /// Orders with no value left, and orders that fit nowhere, are discarded
    /// and their couriers cancelled.
    pub fn add_order_to_shelf(&self, order: Arc<PreparedOrder>) -> Placement {
        if order.is_expired(false) {
            warn!(order_id = %order.id(), name = order.name(), "Order expired before shelving, discarding");
            return self.discard(&order, DiscardReason::ExpiredOnArrival);
        }

        for area in [self.home_area(order.temperature()), &self.overflow] {
            if area.shelf.put(order.clone()) {
                self.stats.order_placed();
                info!(
                    order_id = %order.id(),
                    name = order.name(),
                    shelf = area.shelf.name(),
                    size = area.shelf.size(),
                    "Order placed"
                );
                self.sink.publish(StatusEvent::Added {
                    shelf: area.shelf.name().to_string(),
                    order_status: area.status_of(&order),
                });
                return Placement::Shelved(area.shelf.kind());
            }
        }

        warn!(order_id = %order.id(), name = order.name(), "No room on any shelf, discarding");
        self.discard(&order, DiscardReason::NoRoom)
    }

    fn discard(&self, order: &PreparedOrder, reason: DiscardReason) -> Placement {
        self.dispatcher.cancel_driver_for_order(order);
        self.stats.order_discarded();
        Placement::Discarded(reason)
    }

    /// Takes `order` off its home shelf or, failing that, off overflow.
    ///
    /// Returns the shelf it was on, or `None` if it was on neither.
    pub fn remove_order_from_shelf(&self, order: &Arc<PreparedOrder>) -> Option<ShelfKind> {
        let _moves = self.overflow.sweep.lock();
        for area in [self.home_area(order.temperature()), &self.overflow] {
            if area.shelf.remove(order) {
                self.sink.publish(StatusEvent::Removed {
                    shelf: area.shelf.name().to_string(),
                    order_status: area.status_of(order),
                });
                return Some(area.shelf.kind());
            }
        }
        None
    }

    /// Hands an order to its arrived courier.
    pub fn handle_arrival(&self, driver: Driver) {
        match self.remove_order_from_shelf(&driver.order) {
            Some(shelf) => {
                self.stats.order_fulfilled();
                info!(
                    driver = %driver.id,
                    order_id = %driver.order.id(),
                    name = driver.order.name(),
                    %shelf,
                    "Order picked up"
                );
            }
            None => info!(
                driver = %driver.id,
                order_id = %driver.order.id(),
                "Driver arrived but the order is not on any shelf"
            ),
        }
    }

    /// Removes expired orders from one shelf and reports what is left.
    pub fn sweep_shelf(&self, kind: ShelfKind) -> ShelfStatus {
        let area = self.area(kind);
        let _sweep = area.sweep.lock();
        self.sweep_area(area)
    }

    fn sweep_area(&self, area: &Area) -> ShelfStatus {
        let name = area.shelf.name();
        for order in area.shelf.sweep() {
            self.dispatcher.cancel_driver_for_order(&order);
            self.stats.order_expired();
            info!(order_id = %order.id(), name = order.name(), shelf = name, "Order expired");
            self.sink.publish(StatusEvent::Removed {
                shelf: name.to_string(),
                order_status: area.status_of(&order),
            });
        }

        let statuses: Vec<OrderStatus> = area
            .shelf
            .all()
            .iter()
            .map(|order| area.status_of(order))
            .collect();
        for status in &statuses {
            self.sink.publish(StatusEvent::ValueUpdated {
                shelf: name.to_string(),
                order_status: status.clone(),
            });
        }

        let status = ShelfStatus::new(name, statuses);
        debug!(shelf = name, size = status.len(), "Shelf swept");
        status
    }

    /// Sweeps overflow, then moves every order whose home shelf has room back
    /// home.
    ///
    /// A moved order is re-based first, so the time it spent on overflow is
    /// charged at the overflow rate. If its home fills up in the meantime it
    /// stays on overflow, already re-based.
    pub fn sweep_and_update_overflow_shelf(&self) -> ShelfStatus {
        let _sweep = self.overflow.sweep.lock();
        self.sweep_area(&self.overflow);

        let now = Instant::now();
        for order in self.overflow.shelf.all() {
            let home = self.home_area(order.temperature());
            if !home.shelf.is_full() {
                self.move_home(&order, home, now);
            }
        }

        self.overflow.shelf.status()
    }

    /// Moves one order from overflow to `home`, re-basing it at `now` first.
    ///
    /// Returns whether the move happened. When `home` has no room the order
    /// stays on overflow, already re-based. When the order has left overflow
    /// in the meantime the insert into `home` is taken back.
    fn move_home(&self, order: &Arc<PreparedOrder>, home: &Area, now: Instant) -> bool {
        order.compute_and_assign_value(now, true);
        if !home.shelf.put(order.clone()) {
            debug!(order_id = %order.id(), shelf = home.shelf.name(), "Home shelf filled up, order stays on overflow");
            return false;
        }
        if !self.overflow.shelf.remove(order) {
            home.shelf.remove(order);
            debug!(order_id = %order.id(), "Order left overflow during the move");
            return false;
        }

        self.stats.order_moved();
        info!(
            order_id = %order.id(),
            name = order.name(),
            to = home.shelf.name(),
            "Order moved off overflow"
        );
        self.sink.publish(StatusEvent::Moved {
            from_shelf: self.overflow.shelf.name().to_string(),
            to_shelf: home.shelf.name().to_string(),
            order_status: home.status_of(order),
        });
        true
    }

    /// One housekeeping pass: the three temperature shelves, then overflow.
    pub fn housekeeping(&self) -> Vec<ShelfStatus> {
        let mut statuses: Vec<ShelfStatus> = [ShelfKind::Hot, ShelfKind::Cold, ShelfKind::Frozen]
            .into_iter()
            .map(|kind| self.sweep_shelf(kind))
            .collect();
        statuses.push(self.sweep_and_update_overflow_shelf());
        statuses
    }

    /// Sweeps all four shelves without moving anything.
    pub fn sweep_shelves_on_demand(&self) -> Vec<ShelfStatus> {
        ShelfKind::ALL
            .into_iter()
            .map(|kind| self.sweep_shelf(kind))
            .collect()
    }
}

#[async_trait]
impl Worker<Arc<PreparedOrder>> for ShelfManager {
    async fn handle(&self, _worker_id: usize, order: Arc<PreparedOrder>) {
        self.add_order_to_shelf(order);
    }
}

#[async_trait]
impl Worker<Driver> for ShelfManager {
    async fn handle(&self, _worker_id: usize, driver: Driver) {
        self.handle_arrival(driver);
    }
}
