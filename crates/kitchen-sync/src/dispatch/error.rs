use kitchen_framework::FrameworkError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatch loop has stopped taking requests.
    #[error("dispatcher unavailable: {0}")]
    Unavailable(#[from] FrameworkError),
}
