//! # Kitchen Framework
//!
//! The plumbing underneath the kitchen's pipeline stages. Nothing in here knows
//! about orders or shelves; it moves work between tasks and decides when tasks
//! run.
//!
//! ## Building Blocks
//!
//! 1. **Queues** ([`queue`]) - named bounded MPSC channels. Every hop between
//!    stages is one, so a slow stage pushes back on its producers instead of
//!    buffering without limit.
//! 2. **Worker pools** ([`WorkerPool`], [`Worker`]) - N tasks draining one queue
//!    into shared stage logic. A single-consumer loop is a pool of one.
//! 3. **Timers** ([`ScheduledTask`], [`Ticker`]) - one-shot and periodic work,
//!    both stopped through a `CancellationToken` rather than by aborting tasks.
//! 4. **Observability** ([`setup_tracing`](crate::tracing::setup_tracing)) - one subscriber for the
//!    whole process.
//! 5. **Test doubles** ([`mock::Recorder`]) - call logs for fake neighbours.
//!
//! ## Concurrency Model
//!
//! - Each stage runs in its own Tokio task(s).
//! - Stages share no memory except through queues or through state that
//!   synchronises itself internally.
//! - Shutdown is either *drain* (drop every producer, consumers finish the
//!   queue) or *stop* (cancel the token, consumers exit at their next await).
//!   Cyclic stage graphs need the token.
//!
//! Stages are not single-owner actors. Several tasks act on the same shelf or
//! courier at once (placement, pickup, housekeeping and courier timers), and
//! each of those must see the shelf as it is *now*, not as a message queue
//! will eventually describe it. Such state sits behind short `parking_lot`
//! locks that are never held across an `.await`. Queues carry the work between
//! stages; locks only guard the state two stages both touch.
//!
//! ## Example
//!
//! ```rust
//! use kitchen_framework::{queue, Worker, WorkerPool};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl Worker<String> for Printer {
//!     async fn handle(&self, worker_id: usize, item: String) {
//!         println!("worker {worker_id}: {item}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, receiver) = queue("lines", 8);
//!     let handles = WorkerPool::new("printer", 2)
//!         .spawn(receiver, Arc::new(Printer), CancellationToken::new());
//!
//!     client.send("hello".to_string()).await.unwrap();
//!     drop(client);
//!     for handle in handles {
//!         handle.await.unwrap();
//!     }
//! }
//! ```

pub mod error;
pub mod mock;
pub mod queue;
pub mod timer;
pub mod tracing;
pub mod worker;

pub use error::FrameworkError;
pub use queue::{queue, QueueClient};
pub use timer::{ScheduledTask, Ticker};
pub use worker::{Worker, WorkerPool};
