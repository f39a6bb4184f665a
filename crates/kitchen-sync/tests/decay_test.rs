use kitchen_sync::model::{Order, PreparedOrder};
use proptest::prelude::*;
use std::time::Duration;
use tokio::time::Instant;

proptest! {
    /// Re-basing after `a` seconds and then decaying for `b` more lands where
    /// decaying for `a + b` straight would, as long as the value stays positive.
    #[test]
    fn test_rebasing_composes(
        shelf_life in 400i64..1000,
        decay_rate in 0.0f64..2.0,
        a in 0u64..30,
        b in 0u64..30,
        in_overflow: bool,
    ) {
        let order = Order::new("Pho", "hot", shelf_life, decay_rate).unwrap();
        let t0 = Instant::now();
        let straight = PreparedOrder::prepared_at(order.clone(), t0);
        let rebased = PreparedOrder::prepared_at(order, t0);

        let expected = straight.value_after(a + b, in_overflow);
        rebased.compute_and_assign_value(t0 + Duration::from_secs(a), in_overflow);
        let actual = rebased.value_at(t0 + Duration::from_secs(a + b), in_overflow);

        prop_assert!(expected > 0.0);
        prop_assert!((expected - actual).abs() < 1e-9, "{} vs {}", expected, actual);
    }

    /// The overflow rate is never kinder than the home rate.
    #[test]
    fn test_overflow_never_slower(
        shelf_life in 0i64..1000,
        decay_rate in 0.0f64..2.0,
        age in 0u64..600,
    ) {
        let order = PreparedOrder::new(Order::new("Pho", "hot", shelf_life, decay_rate).unwrap());
        prop_assert!(order.value_after(age, true) <= order.value_after(age, false));
        prop_assert!(order.value_after(age, true) >= 0.0);
    }
}
