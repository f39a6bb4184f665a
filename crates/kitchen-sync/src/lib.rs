//! # Kitchen Sync
//!
//! A real-time order fulfillment engine. Orders are prepared, held on
//! temperature-specific shelves where their value decays, and picked up by
//! couriers that arrive after a random delay.
//!
//! ## Pipeline
//!
//! ```text
//! KitchenClient ─▶ orders ─▶ preparation pool ─┬─▶ dispatcher ─▶ (timer) ─▶ arrivals ─┐
//!                                              └─▶ placement ─────────────────────────┤
//!                                                                                     ▼
//!                                                  housekeeping ticker ─▶ ShelfManager
//! ```
//!
//! ## Modules
//!
//! - **[expression]**: the decay formula evaluator.
//! - **[model]**: orders, prepared orders and status snapshots.
//! - **[shelf]**: a single bounded holding area.
//! - **[shelf_manager]**: placement, pickup, expiry sweeps and overflow moves.
//! - **[dispatch]**: courier scheduling and cancellation.
//! - **[preparation]**: the worker pool that prepares orders.
//! - **[lifecycle]**: configuration and [`KitchenSystem`](lifecycle::KitchenSystem).
//! - **[clients]**: order intake.
//! - **[generator]**: replays a JSON order file at a Poisson rate.
//!
//! ## Testing
//!
//! [`MockDispatcher`](dispatch::MockDispatcher) and
//! [`RecordingSink`](shelf_manager::RecordingSink) stand in for the real
//! neighbours of the shelf manager and the preparation pool.

pub mod clients;
pub mod dispatch;
pub mod error;
pub mod expression;
pub mod generator;
pub mod lifecycle;
pub mod metrics;
pub mod model;
pub mod preparation;
pub mod shelf;
pub mod shelf_manager;

pub use error::KitchenError;
