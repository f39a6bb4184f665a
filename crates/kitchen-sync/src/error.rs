//! Top-level error type for the kitchen.

use crate::lifecycle::ConfigError;
use crate::model::ValidationError;
use kitchen_framework::FrameworkError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KitchenError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Queue(#[from] FrameworkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read orders from {path}: {source}")]
    OrderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed order feed: {0}")]
    OrderFeed(#[from] serde_json::Error),

    #[error("kitchen task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
