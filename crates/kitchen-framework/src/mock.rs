//! # Test Doubles
//!
//! Pipeline stages talk to each other through traits (a dispatcher, a status
//! sink). Testing one stage means replacing its neighbours with something that
//! remembers what it was asked to do. [`Recorder`] is that memory: a thread-safe
//! call log with an expectation count and an async wait.
//!
//! ## When to use a Recorder vs the real stage
//!
//! | | Recorder-backed double | Real stage |
//! |---|---|---|
//! | **Timing** | Immediate | Subject to timers and the scheduler |
//! | **State** | Call log only | Real tracking and side effects |
//! | **Use case** | Unit testing the stage *around* the neighbour | End-to-end runs |
//!
//! ## Example
//!
//! ```rust
//! use kitchen_framework::mock::Recorder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let recorder = Recorder::<String>::new();
//!     recorder.expect_calls(2);
//!
//!     recorder.record("first".to_string());
//!     recorder.record("second".to_string());
//!
//!     recorder.wait_for(2).await;
//!     assert_eq!(recorder.calls(), vec!["first", "second"]);
//!     recorder.verify();
//! }
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

/// A cloneable, thread-safe call log.
///
/// Clones share the same log, so a test can keep one clone while the code
/// under test owns another.
#[derive(Debug)]
pub struct Recorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
    expected: Arc<Mutex<Option<usize>>>,
    notify: Arc<Notify>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
            expected: self.expected.clone(),
            notify: self.notify.clone(),
        }
    }
}

impl<T: Clone> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            expected: Arc::new(Mutex::new(None)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Appends a call and wakes anyone in [`wait_for`](Recorder::wait_for).
    pub fn record(&self, call: T) {
        self.calls.lock().push(call);
        self.notify.notify_waiters();
    }

    /// A snapshot of every recorded call, oldest first.
    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declares how many calls [`verify`](Recorder::verify) should find.
    pub fn expect_calls(&self, count: usize) {
        *self.expected.lock() = Some(count);
    }

    /// Panics unless the recorded call count matches the expectation.
    pub fn verify(&self) {
        if let Some(expected) = *self.expected.lock() {
            let actual = self.len();
            if actual != expected {
                panic!("Expected {} calls, recorded {}", expected, actual);
            }
        }
    }

    /// Waits until at least `count` calls have been recorded.
    ///
    /// Wrap in `tokio::time::timeout` when the calls might never come.
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.len() >= count {
                return;
            }
            notified.await;
        }
    }
}
