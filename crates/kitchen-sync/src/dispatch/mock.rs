use crate::dispatch::{DispatchError, Dispatcher};
use crate::model::{OrderId, PreparedOrder};
use async_trait::async_trait;
use kitchen_framework::mock::Recorder;
use std::sync::Arc;

/// A [`Dispatcher`] that only records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct MockDispatcher {
    pub dispatched: Recorder<Arc<PreparedOrder>>,
    pub cancelled: Recorder<OrderId>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelled_ids(&self) -> Vec<OrderId> {
        self.cancelled.calls()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn dispatch_driver(&self, order: Arc<PreparedOrder>) -> Result<(), DispatchError> {
        self.dispatched.record(order);
        Ok(())
    }

    fn cancel_driver_for_order(&self, order: &PreparedOrder) {
        self.cancelled.record(order.id());
    }
}
