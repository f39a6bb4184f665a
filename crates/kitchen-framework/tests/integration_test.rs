use async_trait::async_trait;
use kitchen_framework::mock::Recorder;
use kitchen_framework::{queue, QueueClient, ScheduledTask, Worker, WorkerPool};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// First stage: doubles the number and forwards it after a delay.
struct Doubler {
    next: QueueClient<u64>,
    shutdown: CancellationToken,
}

#[async_trait]
impl Worker<u64> for Doubler {
    async fn handle(&self, _worker_id: usize, item: u64) {
        let next = self.next.clone();
        // Detached: the worker is free for the next item while the timer runs.
        let _task = ScheduledTask::spawn(
            Duration::from_millis(item * 100),
            self.shutdown.child_token(),
            async move {
                let _ = next.send(item * 2).await;
            },
        );
    }
}

/// Second stage: records what arrives.
struct Sink {
    seen: Recorder<u64>,
}

#[async_trait]
impl Worker<u64> for Sink {
    async fn handle(&self, _worker_id: usize, item: u64) {
        self.seen.record(item);
    }
}

/// Two chained pools with delayed hand-off between them.
#[tokio::test(start_paused = true)]
async fn test_chained_pools_with_delayed_handoff() {
    let shutdown = CancellationToken::new();
    let (input, input_rx) = queue("input", 4);
    let (output, output_rx) = queue("output", 4);

    let seen = Recorder::new();
    let mut handles = WorkerPool::new("doubler", 2).spawn(
        input_rx,
        Arc::new(Doubler {
            next: output,
            shutdown: shutdown.clone(),
        }),
        shutdown.clone(),
    );
    handles.extend(WorkerPool::new("sink", 1).spawn(
        output_rx,
        Arc::new(Sink { seen: seen.clone() }),
        shutdown.clone(),
    ));

    for n in [3, 1, 2] {
        input.send(n).await.unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), seen.wait_for(3))
        .await
        .expect("all three items should reach the sink");

    // Delays are proportional to the value, so arrival order is sorted.
    assert_eq!(seen.calls(), vec![2, 4, 6]);

    shutdown.cancel();
    for handle in handles {
        handle.await.unwrap();
    }
}

/// Cancelling the parent token drops timers that have not fired yet.
#[tokio::test(start_paused = true)]
async fn test_shutdown_drops_pending_timers() {
    let shutdown = CancellationToken::new();
    let seen = Recorder::<u64>::new();
    let recorder = seen.clone();

    let task = ScheduledTask::spawn(
        Duration::from_secs(10),
        shutdown.child_token(),
        async move {
            recorder.record(1);
        },
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown.cancel();
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert!(task.is_cancelled());
    assert!(seen.is_empty());
}
