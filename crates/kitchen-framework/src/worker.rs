//! # Worker Pools
//!
//! A pipeline stage is a [`Worker`] plus a [`WorkerPool`] that feeds it. The pool
//! spawns a fixed number of Tokio tasks that all drain the *same* bounded queue,
//! so adding workers adds throughput without adding queues.
//!
//! A stage with a single consumer (a loop that must see items in queue order) is
//! just a pool of size one.
//!
//! ## Stopping
//!
//! Workers exit when either:
//! 1. every producer has been dropped and the queue is drained (`recv()` returns `None`), or
//! 2. the shared [`CancellationToken`] is cancelled. Items still queued are dropped.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Business logic of a pipeline stage.
///
/// Implementations hold their own collaborators (queue clients, shared state)
/// and are shared between all workers of a pool through an `Arc`, so `handle`
/// takes `&self`. Any per-item mutable state must live inside the item.
#[async_trait]
pub trait Worker<T: Send + 'static>: Send + Sync + 'static {
    /// Processes one item taken off the queue.
    ///
    /// `worker_id` identifies the task within the pool. It is for logging only.
    async fn handle(&self, worker_id: usize, item: T);
}

/// Spawns and names the tasks of one pipeline stage.
pub struct WorkerPool {
    name: &'static str,
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(name: &'static str, worker_count: usize) -> Self {
        Self { name, worker_count }
    }

    /// Starts `worker_count` tasks draining `receiver` into `worker`.
    ///
    /// Returns one handle per task. A pool of size zero is bumped to one so a
    /// misconfigured stage still makes progress.
    pub fn spawn<T, W>(
        &self,
        receiver: mpsc::Receiver<T>,
        worker: Arc<W>,
        cancel: CancellationToken,
    ) -> Vec<JoinHandle<()>>
    where
        T: Send + 'static,
        W: Worker<T>,
    {
        let receiver = Arc::new(Mutex::new(receiver));
        let count = self.worker_count.max(1);
        info!(pool = self.name, workers = count, "Worker pool starting");

        (0..count)
            .map(|worker_id| {
                let receiver = receiver.clone();
                let worker = worker.clone();
                let cancel = cancel.clone();
                let pool = self.name;
                tokio::spawn(async move {
                    run_worker(pool, worker_id, receiver, worker, cancel).await;
                })
            })
            .collect()
    }
}

async fn run_worker<T, W>(
    pool: &'static str,
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<T>>>,
    worker: Arc<W>,
    cancel: CancellationToken,
) where
    T: Send + 'static,
    W: Worker<T>,
{
    debug!(pool, worker_id, "Worker started");
    let mut handled: u64 = 0;

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            item = async { receiver.lock().await.recv().await } => item,
        };
        match next {
            Some(item) => {
                worker.handle(worker_id, item).await;
                handled += 1;
            }
            None => break,
        }
    }

    debug!(pool, worker_id, handled, "Worker stopped");
}
