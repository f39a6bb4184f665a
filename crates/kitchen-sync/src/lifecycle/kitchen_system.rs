use crate::clients::KitchenClient;
use crate::dispatch::DriverDispatcher;
use crate::error::KitchenError;
use crate::lifecycle::KitchenConfig;
use crate::metrics::{KitchenStats, StatsSnapshot};
use crate::preparation::OrderPreparationService;
use crate::shelf_manager::{ShelfManager, StatusSink};
use kitchen_framework::queue;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long shutdown waits for queued orders to be prepared and shelved.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// A running kitchen.
///
/// `KitchenSystem` owns the lifecycle of every stage:
/// - **Wiring**: builds the queues, the dispatcher, the shelf manager and the
///   preparation pool from one [`KitchenConfig`], and injects them into each other.
/// - **Startup**: spawns every loop and timer.
/// - **Shutdown**: drains what can be drained, then stops the rest.
///
/// # Example
///
/// ```ignore
/// let system = KitchenSystem::new(&KitchenConfig::default(), Arc::new(LogSink));
/// system.client.submit_request(request).await?;
/// let stats = system.shutdown().await?;
/// ```
pub struct KitchenSystem {
    /// Order intake. Dropped first on shutdown.
    pub client: KitchenClient,

    pub shelf_manager: Arc<ShelfManager>,

    pub dispatcher: DriverDispatcher,

    pub stats: Arc<KitchenStats>,

    shutdown: CancellationToken,
    kitchen: Vec<JoinHandle<()>>,
    placement: Vec<JoinHandle<()>>,
    background: Vec<JoinHandle<()>>,
}

impl KitchenSystem {
    /// Builds and starts a kitchen. Must be called inside a Tokio runtime.
    pub fn new(config: &KitchenConfig, sink: Arc<dyn StatusSink>) -> Self {
        let stats = Arc::new(KitchenStats::new());
        let shutdown = CancellationToken::new();
        let capacity = config.queue_capacity.max(1);

        // 1. Queues between the stages
        let (orders, order_receiver) = queue("orders", capacity);
        let (placements, placement_receiver) = queue("placement", capacity);
        let (arrivals, arrival_receiver) = queue("arrivals", capacity);

        // 2. Dispatcher first: both other stages depend on it
        let (dispatch_loop, dispatcher) =
            DriverDispatcher::new(config.arrival_window(), arrivals, stats.clone(), capacity);
        let dispatch_handle = dispatch_loop.initialize(shutdown.clone());

        // 3. Shelves, fed by placements and arrivals
        let shelf_manager = Arc::new(ShelfManager::new(
            config.shelf_capacities(),
            Arc::new(dispatcher.clone()),
            sink,
            stats.clone(),
        ));
        let tasks = shelf_manager.initialize(
            placement_receiver,
            arrival_receiver,
            config.housekeeping(),
            shutdown.clone(),
        );

        // 4. Chefs
        let kitchen = OrderPreparationService::new(
            Arc::new(dispatcher.clone()),
            placements,
            stats.clone(),
        )
        .initialize(config.chef_count, order_receiver, shutdown.clone());

        let mut background = vec![dispatch_handle, tasks.housekeeping];
        background.extend(tasks.pickup);

        info!(
            chefs = config.chef_count,
            hot = config.hot_shelf_size,
            cold = config.cold_shelf_size,
            frozen = config.frozen_shelf_size,
            overflow = config.overflow_shelf_size,
            "Kitchen open"
        );

        Self {
            client: KitchenClient::new(orders, stats.clone()),
            shelf_manager,
            dispatcher,
            stats,
            shutdown,
            kitchen,
            placement: tasks.placement,
            background,
        }
    }

    /// Closes the kitchen and returns the final counters.
    ///
    /// 1. Drops the intake client so the order queue closes once other
    ///    clones are gone.
    /// 2. Waits (up to a grace period) for the chefs to finish the queue and
    ///    for the placement loop to shelve what they produced.
    /// 3. Cancels the shutdown token, which stops the dispatcher, its pending
    ///    courier timers, the pickup loop and housekeeping.
    /// 4. Waits for every task, failing if any of them panicked.
    ///
    /// The dispatcher and the shelf manager refer to each other, so step 3 is
    /// what actually ends the cycle; closing queues alone never would.
    pub async fn shutdown(self) -> Result<StatsSnapshot, KitchenError> {
        info!("Closing kitchen...");
        drop(self.client);

        let mut kitchen = self.kitchen;
        let mut placement = self.placement;
        let drained = tokio::time::timeout(DRAIN_GRACE, async {
            join_all(&mut kitchen).await?;
            join_all(&mut placement).await
        })
        .await;
        match drained {
            Ok(result) => result?,
            Err(_) => warn!(
                grace_secs = DRAIN_GRACE.as_secs(),
                "Kitchen did not drain in time, stopping anyway"
            ),
        }

        self.shutdown.cancel();
        join_all(&mut kitchen).await?;
        join_all(&mut placement).await?;
        let mut background = self.background;
        join_all(&mut background).await?;

        let snapshot = self.stats.snapshot();
        info!(stats = ?snapshot, "Kitchen closed");
        Ok(snapshot)
    }
}

async fn join_all(handles: &mut Vec<JoinHandle<()>>) -> Result<(), KitchenError> {
    while let Some(handle) = handles.last_mut() {
        let result = handle.await;
        handles.pop();
        if let Err(e) = result {
            error!(error = %e, "Kitchen task failed");
            return Err(e.into());
        }
    }
    Ok(())
}
