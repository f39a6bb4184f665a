//! # Bounded Queues
//!
//! Every hop in the pipeline is a bounded Tokio MPSC channel. [`queue`] creates
//! one and hands back a [`QueueClient`] (the producer half, cheap to clone) and
//! the raw receiver, which is given to exactly one consumer stage.
//!
//! The client carries the queue's name so that failures read as
//! `Queue closed: placement` instead of an anonymous `SendError`.

use crate::error::FrameworkError;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

/// Creates a named bounded queue.
///
/// # Arguments
///
/// * `name` - Used in logs and errors.
/// * `capacity` - Maximum number of items buffered. Senders wait once it is reached.
pub fn queue<T: Send + 'static>(
    name: &'static str,
    capacity: usize,
) -> (QueueClient<T>, mpsc::Receiver<T>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (QueueClient { name, sender }, receiver)
}

/// Producer half of a named bounded queue.
///
/// * **Cloneable** – holds only a sender.
/// * **Backpressure** – [`send`](QueueClient::send) waits while the queue is full.
/// * **Closure** – once every clone is dropped the consumer's `recv()` returns `None`.
pub struct QueueClient<T> {
    name: &'static str,
    sender: mpsc::Sender<T>,
}

impl<T> Clone for QueueClient<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sender: self.sender.clone(),
        }
    }
}

impl<T: Send + 'static> QueueClient<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enqueues an item, waiting for room if the queue is full.
    pub async fn send(&self, item: T) -> Result<(), FrameworkError> {
        trace!(queue = self.name, "send");
        self.sender
            .send(item)
            .await
            .map_err(|_| FrameworkError::QueueClosed(self.name))
    }

    /// Enqueues an item without waiting.
    pub fn try_send(&self, item: T) -> Result<(), FrameworkError> {
        self.sender.try_send(item).map_err(|e| match e {
            TrySendError::Full(_) => FrameworkError::QueueFull(self.name),
            TrySendError::Closed(_) => FrameworkError::QueueClosed(self.name),
        })
    }

    /// True once the consumer has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}
