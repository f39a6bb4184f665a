use kitchen_framework::queue;
use kitchen_sync::dispatch::{ArrivalWindow, Dispatcher, DriverDispatcher};
use kitchen_sync::metrics::KitchenStats;
use kitchen_sync::model::{Order, PreparedOrder};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn prepared(name: &str) -> Arc<PreparedOrder> {
    Arc::new(PreparedOrder::new(
        Order::new(name, "hot", 1000, 0.1).unwrap(),
    ))
}

proptest! {
    #[test]
    fn test_delays_stay_within_window(min in 0u64..20, span in 0u64..20, seed: u64) {
        let window = ArrivalWindow::new(min, min + span);
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..1000 {
            let delay = window.sample(&mut rng);
            prop_assert!(delay >= Duration::from_secs(min));
            prop_assert!(delay <= Duration::from_secs(min + span));
        }
    }
}

/// Every courier arrives between the window bounds after dispatch.
#[tokio::test(start_paused = true)]
async fn test_couriers_arrive_within_window() {
    let (arrivals, mut arrived) = queue("arrivals", 64);
    let stats = Arc::new(KitchenStats::new());
    let (dispatch_loop, dispatcher) =
        DriverDispatcher::new(ArrivalWindow::new(2, 10), arrivals, stats.clone(), 8);
    let shutdown = CancellationToken::new();
    let handle = dispatch_loop.initialize(shutdown.clone());

    let orders: Vec<_> = (0..30).map(|i| prepared(&format!("Order {i}"))).collect();
    for order in &orders {
        dispatcher.dispatch_driver(order.clone()).await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(1900)).await;
    assert!(arrived.try_recv().is_err());
    assert_eq!(dispatcher.tracked_count(), 30);
    for order in &orders {
        let driver = dispatcher.driver_for(&order.id()).unwrap();
        assert!(driver.arrival_delay >= Duration::from_secs(2));
        assert!(driver.arrival_delay <= Duration::from_secs(10));
    }

    tokio::time::sleep(Duration::from_millis(8200)).await;
    let mut count = 0;
    while arrived.try_recv().is_ok() {
        count += 1;
    }
    assert_eq!(count, 30);
    assert_eq!(dispatcher.tracked_count(), 0);
    assert_eq!(stats.snapshot().drivers_dispatched, 30);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_semantics() {
    let (arrivals, mut arrived) = queue("arrivals", 8);
    let stats = Arc::new(KitchenStats::new());
    let (dispatch_loop, dispatcher) =
        DriverDispatcher::new(ArrivalWindow::new(3, 3), arrivals, stats.clone(), 8);
    let shutdown = CancellationToken::new();
    let handle = dispatch_loop.initialize(shutdown.clone());

    let cancelled = prepared("Cancelled");
    let delivered = prepared("Delivered");
    dispatcher.dispatch_driver(cancelled.clone()).await.unwrap();
    dispatcher.dispatch_driver(delivered.clone()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Cancelling before the timer fires stops the arrival.
    dispatcher.cancel_driver_for_order(&cancelled);
    assert!(!dispatcher.is_tracking(&cancelled.id()));
    assert!(dispatcher.is_tracking(&delivered.id()));

    tokio::time::sleep(Duration::from_secs(3)).await;
    let driver = arrived.try_recv().unwrap();
    assert_eq!(driver.order.id(), delivered.id());
    assert!(arrived.try_recv().is_err());

    // Cancelling after arrival, or for an unknown order, is a no-op.
    dispatcher.cancel_driver_for_order(&delivered);
    dispatcher.cancel_driver_for_order(&prepared("Never dispatched"));
    assert_eq!(stats.snapshot().drivers_cancelled, 1);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drops_pending_couriers() {
    let (arrivals, mut arrived) = queue("arrivals", 8);
    let (dispatch_loop, dispatcher) = DriverDispatcher::new(
        ArrivalWindow::new(5, 5),
        arrivals,
        Arc::new(KitchenStats::new()),
        8,
    );
    let shutdown = CancellationToken::new();
    let handle = dispatch_loop.initialize(shutdown.clone());

    dispatcher.dispatch_driver(prepared("Pending")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(dispatcher.tracked_count(), 1);

    shutdown.cancel();
    handle.await.unwrap();
    assert_eq!(dispatcher.tracked_count(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(arrived.try_recv().is_err());
    assert!(dispatcher.dispatch_driver(prepared("Late")).await.is_err());
}
