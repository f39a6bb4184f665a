//! Where status events go.

use crate::model::StatusEvent;
use kitchen_framework::mock::Recorder;
use kitchen_framework::{FrameworkError, QueueClient};
use tracing::{debug, info, warn};

/// Receives every shelf change the manager makes.
///
/// Called from inside manager operations, so implementations must not block.
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: StatusEvent);
}

/// Forwards events to a bounded queue. Events that do not fit are dropped.
pub struct ChannelSink {
    queue: QueueClient<StatusEvent>,
}

impl ChannelSink {
    pub fn new(queue: QueueClient<StatusEvent>) -> Self {
        Self { queue }
    }
}

impl StatusSink for ChannelSink {
    fn publish(&self, event: StatusEvent) {
        let action = event.action();
        match self.queue.try_send(event) {
            Ok(()) => {}
            Err(FrameworkError::QueueFull(queue)) => {
                warn!(queue, action, "Status queue full, event dropped")
            }
            Err(FrameworkError::QueueClosed(queue)) => {
                debug!(queue, action, "Status queue closed, event dropped")
            }
        }
    }
}

/// Writes events to the log as JSON.
///
/// Value updates arrive on every tick for every order, so they are logged at
/// debug level and everything else at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn publish(&self, event: StatusEvent) {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, action = event.action(), "Status event not serializable");
                return;
            }
        };
        match event {
            StatusEvent::ValueUpdated { .. } => debug!(event = %json, "Status"),
            _ => info!(event = %json, "Status"),
        }
    }
}

/// Keeps every event for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Recorder<StatusEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.calls()
    }

    /// Recorded events with the given `action` tag.
    pub fn events_with_action(&self, action: &str) -> Vec<StatusEvent> {
        self.events
            .calls()
            .into_iter()
            .filter(|event| event.action() == action)
            .collect()
    }
}

impl StatusSink for RecordingSink {
    fn publish(&self, event: StatusEvent) {
        self.events.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, OrderStatus, Temperature};
    use kitchen_framework::queue;
    use uuid::Uuid;

    fn added() -> StatusEvent {
        StatusEvent::Added {
            shelf: "hot".to_string(),
            order_status: OrderStatus {
                id: OrderId(Uuid::nil()),
                name: "Pho".to_string(),
                shelf: "hot".to_string(),
                temp: Temperature::Hot,
                value: 1.0,
                normalized_value: 1.0,
            },
        }
    }

    #[tokio::test]
    async fn test_channel_sink_drops_when_full() {
        let (client, mut receiver) = queue("status", 1);
        let sink = ChannelSink::new(client);
        sink.publish(added());
        sink.publish(added());

        assert_eq!(receiver.recv().await, Some(added()));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_recording_sink_filters_by_action() {
        let sink = RecordingSink::new();
        sink.publish(added());
        assert_eq!(sink.events_with_action("add-order").len(), 1);
        assert!(sink.events_with_action("move-order").is_empty());
    }
}
