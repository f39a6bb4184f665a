//! # Order Preparation
//!
//! A pool of chefs draining the inbound order queue. Each chef turns an
//! [`Order`] into a [`PreparedOrder`], asks the dispatcher for a courier and
//! hands the order on to the placement queue.

use crate::dispatch::Dispatcher;
use crate::metrics::KitchenStats;
use crate::model::{Order, PreparedOrder};
use async_trait::async_trait;
use kitchen_framework::{QueueClient, Worker, WorkerPool};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct OrderPreparationService {
    dispatcher: Arc<dyn Dispatcher>,
    placements: QueueClient<Arc<PreparedOrder>>,
    stats: Arc<KitchenStats>,
}

impl OrderPreparationService {
    pub fn new(
        dispatcher: Arc<dyn Dispatcher>,
        placements: QueueClient<Arc<PreparedOrder>>,
        stats: Arc<KitchenStats>,
    ) -> Self {
        Self {
            dispatcher,
            placements,
            stats,
        }
    }

    /// Starts `chef_count` workers on `orders`.
    ///
    /// Workers finish the queue once every producer is dropped. The service,
    /// and with it the placement queue client, is released when the last
    /// worker exits.
    pub fn initialize(
        self,
        chef_count: usize,
        orders: mpsc::Receiver<Order>,
        shutdown: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        WorkerPool::new("kitchen", chef_count).spawn(orders, Arc::new(self), shutdown)
    }

    /// Prepares one order and sends it on its way.
    pub async fn prepare(&self, chef: usize, order: Order) -> Arc<PreparedOrder> {
        let prepared = Arc::new(PreparedOrder::new(order));
        self.stats.order_prepared();
        info!(
            chef,
            order_id = %prepared.id(),
            name = prepared.name(),
            temp = %prepared.temperature(),
            "Order prepared"
        );

        if let Err(e) = self.dispatcher.dispatch_driver(prepared.clone()).await {
            warn!(order_id = %prepared.id(), error = %e, "No driver dispatched");
        }
        if let Err(e) = self.placements.send(prepared.clone()).await {
            warn!(order_id = %prepared.id(), error = %e, "Prepared order dropped");
        }
        prepared
    }
}

#[async_trait]
impl Worker<Order> for OrderPreparationService {
    async fn handle(&self, worker_id: usize, order: Order) {
        self.prepare(worker_id, order).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MockDispatcher;
    use kitchen_framework::queue;

    #[tokio::test]
    async fn test_every_order_is_dispatched_and_placed() {
        let dispatcher = MockDispatcher::new();
        let (placements, mut placed) = queue("placement", 8);
        let (orders, receiver) = queue("orders", 8);
        let stats = Arc::new(KitchenStats::new());

        let handles = OrderPreparationService::new(
            Arc::new(dispatcher.clone()),
            placements,
            stats.clone(),
        )
        .initialize(3, receiver, CancellationToken::new());

        let order = Order::new("Pho", "hot", 100, 0.1).unwrap();
        let id = order.id();
        orders.send(order).await.unwrap();
        orders
            .send(Order::new("Gelato", "frozen", 100, 0.1).unwrap())
            .await
            .unwrap();
        drop(orders);
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(dispatcher.dispatched.len(), 2);
        let mut placed_ids = Vec::new();
        while let Some(order) = placed.recv().await {
            placed_ids.push(order.id());
        }
        assert_eq!(placed_ids.len(), 2);
        assert!(placed_ids.contains(&id));
        assert_eq!(stats.snapshot().orders_prepared, 2);
    }
}
