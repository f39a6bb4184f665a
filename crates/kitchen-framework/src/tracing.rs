//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber. Every stage logs with
//! `tracing` macros and structured fields (`order_id`, `shelf`, `driver`, `size`),
//! so one line per state change is enough to follow an order through the kitchen.
//!
//! ```bash
//! RUST_LOG=info cargo run     # placements, pickups, discards
//! RUST_LOG=debug cargo run    # per-tick values and queue traffic
//! RUST_LOG=kitchen_sync::dispatch=debug cargo run
//! ```
//!
//! The output is compact and hides module paths (`with_target(false)`); the
//! structured fields already say which stage is talking.

/// Initializes the subscriber from `RUST_LOG`.
///
/// Calling it twice (e.g. from several tests) is harmless: the second call
/// leaves the first subscriber in place.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
