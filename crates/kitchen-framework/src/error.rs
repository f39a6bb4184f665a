//! # Framework Errors
//!
//! Errors raised by the plumbing shared between pipeline stages. Stage-specific
//! failures (validation, dispatch, configuration) live next to the stage that
//! raises them and wrap these where a queue is involved.

/// Errors that can occur while moving work between stages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameworkError {
    /// The receiving side of the queue has been dropped; the stage is gone.
    #[error("Queue closed: {0}")]
    QueueClosed(&'static str),
    /// A non-waiting send found the queue at capacity.
    #[error("Queue full: {0}")]
    QueueFull(&'static str),
}
