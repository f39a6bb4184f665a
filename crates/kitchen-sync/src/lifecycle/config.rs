//! Kitchen configuration.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock kitchen:
//!
//! ```toml
//! hot-shelf-size = 15
//! cold-shelf-size = 15
//! frozen-shelf-size = 15
//! overflow-shelf-size = 20
//! driver-min-arrival-secs = 2
//! driver-max-arrival-secs = 10
//! chef-count = 10
//! housekeeping-period-ms = 1000
//! housekeeping-initial-delay-ms = 1000
//! queue-capacity = 10
//!
//! [generator]
//! source-path = "orders.json"
//! mean-traffic = 2.0
//! ```

use crate::dispatch::ArrivalWindow;
use crate::shelf_manager::{Housekeeping, ShelfCapacities};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct KitchenConfig {
    pub hot_shelf_size: usize,
    pub cold_shelf_size: usize,
    pub frozen_shelf_size: usize,
    pub overflow_shelf_size: usize,
    pub driver_min_arrival_secs: u64,
    pub driver_max_arrival_secs: u64,
    /// Number of preparation workers.
    pub chef_count: usize,
    pub housekeeping_period_ms: u64,
    pub housekeeping_initial_delay_ms: u64,
    /// Capacity of every internal queue.
    pub queue_capacity: usize,
    pub generator: GeneratorConfig,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            hot_shelf_size: 15,
            cold_shelf_size: 15,
            frozen_shelf_size: 15,
            overflow_shelf_size: 20,
            driver_min_arrival_secs: 2,
            driver_max_arrival_secs: 10,
            chef_count: 10,
            housekeeping_period_ms: 1000,
            housekeeping_initial_delay_ms: 1000,
            queue_capacity: 10,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Settings for the file-driven load generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// JSON array of orders to replay.
    pub source_path: Option<PathBuf>,
    /// Average orders submitted per second.
    pub mean_traffic: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_path: None,
            mean_traffic: 2.0,
        }
    }
}

impl KitchenConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: KitchenConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let shelves = [
            ("hot-shelf-size", self.hot_shelf_size),
            ("cold-shelf-size", self.cold_shelf_size),
            ("frozen-shelf-size", self.frozen_shelf_size),
            ("overflow-shelf-size", self.overflow_shelf_size),
        ];
        if let Some((name, _)) = shelves.iter().find(|(_, size)| *size == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
        }
        if self.driver_min_arrival_secs > self.driver_max_arrival_secs {
            return Err(ConfigError::Invalid(format!(
                "driver-min-arrival-secs ({}) exceeds driver-max-arrival-secs ({})",
                self.driver_min_arrival_secs, self.driver_max_arrival_secs
            )));
        }
        if self.chef_count == 0 {
            return Err(ConfigError::Invalid("chef-count must be at least 1".into()));
        }
        if self.housekeeping_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "housekeeping-period-ms must be at least 1".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue-capacity must be at least 1".into()));
        }
        if !(self.generator.mean_traffic > 0.0) || !self.generator.mean_traffic.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "generator.mean-traffic must be a positive number, got {}",
                self.generator.mean_traffic
            )));
        }
        Ok(())
    }

    pub fn shelf_capacities(&self) -> ShelfCapacities {
        ShelfCapacities {
            hot: self.hot_shelf_size,
            cold: self.cold_shelf_size,
            frozen: self.frozen_shelf_size,
            overflow: self.overflow_shelf_size,
        }
    }

    pub fn arrival_window(&self) -> ArrivalWindow {
        ArrivalWindow::new(self.driver_min_arrival_secs, self.driver_max_arrival_secs)
    }

    pub fn housekeeping(&self) -> Housekeeping {
        Housekeeping {
            period: Duration::from_millis(self.housekeeping_period_ms),
            initial_delay: Duration::from_millis(self.housekeeping_initial_delay_ms),
        }
    }
}
