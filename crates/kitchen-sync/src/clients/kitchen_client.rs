use crate::error::KitchenError;
use crate::metrics::KitchenStats;
use crate::model::{Order, OrderId, OrderRequest};
use kitchen_framework::QueueClient;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Submits orders to a running kitchen.
///
/// Cheap to clone. The kitchen drains and stops once every clone is dropped.
#[derive(Clone)]
pub struct KitchenClient {
    orders: QueueClient<Order>,
    stats: Arc<KitchenStats>,
}

impl KitchenClient {
    pub fn new(orders: QueueClient<Order>, stats: Arc<KitchenStats>) -> Self {
        Self { orders, stats }
    }

    /// Validates a raw order and enqueues it, waiting while the queue is full.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn submit_request(&self, request: OrderRequest) -> Result<OrderId, KitchenError> {
        debug!(?request, "submit_request called");
        let order = request.validate()?;
        let id = order.id();
        self.submit(order).await?;
        Ok(id)
    }

    /// Enqueues an already validated order.
    #[instrument(skip(self, order), fields(order_id = %order.id()))]
    pub async fn submit(&self, order: Order) -> Result<(), KitchenError> {
        self.orders.send(order).await?;
        self.stats.order_submitted();
        info!("Order submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationError;
    use kitchen_framework::queue;

    #[tokio::test]
    async fn test_invalid_order_never_reaches_the_queue() {
        let (orders, mut receiver) = queue("orders", 2);
        let client = KitchenClient::new(orders, Arc::new(KitchenStats::new()));

        let result = client
            .submit_request(OrderRequest::new("Pho", "lukewarm", 10, 0.1))
            .await;
        assert!(matches!(
            result,
            Err(KitchenError::Validation(ValidationError::UnknownTemperature(_)))
        ));
        assert!(receiver.try_recv().is_err());

        let id = client
            .submit_request(OrderRequest::new("Pho", "hot", 10, 0.1))
            .await
            .unwrap();
        assert_eq!(receiver.recv().await.map(|order| order.id()), Some(id));
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_fails() {
        let (orders, receiver) = queue("orders", 2);
        drop(receiver);
        let client = KitchenClient::new(orders, Arc::new(KitchenStats::new()));
        let result = client
            .submit(Order::new("Pho", "hot", 10, 0.1).unwrap())
            .await;
        assert!(matches!(result, Err(KitchenError::Queue(_))));
    }
}
