//! The random-delay courier dispatcher.
//!
//! Split the way every stage in this crate is split: [`DriverDispatcher::new`]
//! returns a [`DispatchLoop`] (owns the request receiver, spawned once) and a
//! cloneable [`DriverDispatcher`] client that the preparation pool and the
//! shelf manager call.
//!
//! ## Tracking
//!
//! Each courier in flight has two entries: order id → [`Driver`] and driver id →
//! [`ScheduledTask`]. Both live behind one lock, so a cancellation and a timer
//! firing for the same courier see either both entries or neither.
//!
//! A request is also recorded under the same lock before it is queued. A
//! cancellation that lands while the request is still queued withdraws it, and
//! the loop then never schedules that courier.

use crate::dispatch::{DispatchError, Dispatcher, Driver, DriverId};
use crate::metrics::KitchenStats;
use crate::model::{OrderId, PreparedOrder};
use async_trait::async_trait;
use kitchen_framework::{queue, QueueClient, ScheduledTask};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Inclusive range of courier arrival delays, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalWindow {
    min_secs: u64,
    max_secs: u64,
}

impl ArrivalWindow {
    /// Bounds given in either order are accepted.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: min_secs.max(max_secs),
        }
    }

    pub fn min(&self) -> Duration {
        Duration::from_secs(self.min_secs)
    }

    pub fn max(&self) -> Duration {
        Duration::from_secs(self.max_secs)
    }

    /// Draws a delay uniformly from `[min, max]` seconds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.gen_range(self.min_secs..=self.max_secs))
    }
}

impl Default for ArrivalWindow {
    fn default() -> Self {
        Self::new(2, 10)
    }
}

#[derive(Default)]
struct Tracking {
    requested: HashSet<OrderId>,
    drivers: HashMap<OrderId, Driver>,
    timers: HashMap<DriverId, ScheduledTask>,
}

/// Client half of the dispatcher.
#[derive(Clone)]
pub struct DriverDispatcher {
    requests: QueueClient<Arc<PreparedOrder>>,
    tracking: Arc<Mutex<Tracking>>,
    stats: Arc<KitchenStats>,
}

/// The background half: turns dispatch requests into scheduled arrivals.
pub struct DispatchLoop {
    receiver: mpsc::Receiver<Arc<PreparedOrder>>,
    tracking: Arc<Mutex<Tracking>>,
    arrivals: QueueClient<Driver>,
    window: ArrivalWindow,
    stats: Arc<KitchenStats>,
}

impl DriverDispatcher {
    /// Builds both halves. Arrived couriers are sent to `arrivals`.
    pub fn new(
        window: ArrivalWindow,
        arrivals: QueueClient<Driver>,
        stats: Arc<KitchenStats>,
        queue_capacity: usize,
    ) -> (DispatchLoop, DriverDispatcher) {
        let (requests, receiver) = queue("dispatch", queue_capacity.max(1));
        let tracking = Arc::new(Mutex::new(Tracking::default()));
        let dispatch_loop = DispatchLoop {
            receiver,
            tracking: tracking.clone(),
            arrivals,
            window,
            stats: stats.clone(),
        };
        let client = DriverDispatcher {
            requests,
            tracking,
            stats,
        };
        (dispatch_loop, client)
    }

    /// Number of couriers currently on the way.
    pub fn tracked_count(&self) -> usize {
        self.tracking.lock().drivers.len()
    }

    pub fn is_tracking(&self, order_id: &OrderId) -> bool {
        self.tracking.lock().drivers.contains_key(order_id)
    }

    /// The courier on the way for `order_id`, if any.
    pub fn driver_for(&self, order_id: &OrderId) -> Option<Driver> {
        self.tracking.lock().drivers.get(order_id).cloned()
    }
}

#[async_trait]
impl Dispatcher for DriverDispatcher {
    async fn dispatch_driver(&self, order: Arc<PreparedOrder>) -> Result<(), DispatchError> {
        debug!(order_id = %order.id(), "Driver requested");
        self.tracking.lock().requested.insert(order.id());
        if let Err(e) = self.requests.send(order.clone()).await {
            self.tracking.lock().requested.remove(&order.id());
            return Err(e.into());
        }
        Ok(())
    }

    fn cancel_driver_for_order(&self, order: &PreparedOrder) {
        let mut tracking = self.tracking.lock();
        if let Some(driver) = tracking.drivers.remove(&order.id()) {
            if let Some(timer) = tracking.timers.remove(&driver.id) {
                timer.cancel();
            }
            drop(tracking);
            self.stats.driver_cancelled();
            info!(order_id = %order.id(), driver = %driver.id, "Driver cancelled");
        } else if tracking.requested.remove(&order.id()) {
            drop(tracking);
            self.stats.driver_cancelled();
            info!(order_id = %order.id(), "Driver request withdrawn before scheduling");
        } else {
            drop(tracking);
            debug!(order_id = %order.id(), "No driver to cancel");
        }
    }
}

impl DispatchLoop {
    /// Spawns the loop. It stops when `shutdown` is cancelled or every client
    /// has been dropped.
    pub fn initialize(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(mut self, shutdown: CancellationToken) {
        info!(
            min_secs = self.window.min().as_secs(),
            max_secs = self.window.max().as_secs(),
            "Driver dispatcher started"
        );

        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => break,
                order = self.receiver.recv() => order,
            };
            match next {
                Some(order) => self.dispatch(order, &shutdown),
                None => break,
            }
        }

        if shutdown.is_cancelled() {
            let mut tracking = self.tracking.lock();
            for timer in tracking.timers.values() {
                timer.cancel();
            }
            let pending = tracking.drivers.len();
            tracking.requested.clear();
            tracking.timers.clear();
            tracking.drivers.clear();
            info!(pending, "Driver dispatcher stopped, pending drivers dropped");
        } else {
            info!("Driver dispatcher stopped");
        }
    }

    fn dispatch(&self, order: Arc<PreparedOrder>, shutdown: &CancellationToken) {
        let delay = self.window.sample(&mut rand::thread_rng());
        let driver = Driver::new(order.clone(), delay);
        let driver_id = driver.id;

        let mut tracking = self.tracking.lock();
        if !tracking.requested.remove(&order.id()) {
            debug!(order_id = %order.id(), "Dispatch request was withdrawn");
            return;
        }
        if let Some(previous) = tracking.drivers.remove(&order.id()) {
            warn!(order_id = %order.id(), driver = %previous.id, "Replacing driver already on the way");
            if let Some(timer) = tracking.timers.remove(&previous.id) {
                timer.cancel();
            }
        }

        let timer = ScheduledTask::spawn(
            delay,
            shutdown.child_token(),
            arrive(
                self.tracking.clone(),
                driver.clone(),
                self.arrivals.clone(),
            ),
        );
        tracking.drivers.insert(order.id(), driver);
        tracking.timers.insert(driver_id, timer);
        drop(tracking);

        self.stats.driver_dispatched();
        info!(
            order_id = %order.id(),
            driver = %driver_id,
            delay_secs = delay.as_secs(),
            "Driver dispatched"
        );
    }
}

async fn arrive(tracking: Arc<Mutex<Tracking>>, driver: Driver, arrivals: QueueClient<Driver>) {
    let still_wanted = {
        let mut tracking = tracking.lock();
        if tracking.timers.remove(&driver.id).is_some() {
            tracking.drivers.remove(&driver.order.id());
            true
        } else {
            false
        }
    };
    if !still_wanted {
        debug!(driver = %driver.id, "Timer fired for a cancelled driver");
        return;
    }

    debug!(driver = %driver.id, order_id = %driver.order.id(), "Driver arrived");
    if let Err(e) = arrivals.send(driver).await {
        warn!(error = %e, "Driver arrived after the kitchen closed");
    }
}
