//! # Order Generator
//!
//! Replays a JSON file of orders into a kitchen at a configurable average rate.
//! Gaps between orders are exponentially distributed, so submissions form a
//! Poisson process with `mean_traffic` orders per second.

use crate::clients::KitchenClient;
use crate::error::KitchenError;
use crate::model::OrderRequest;
use rand::Rng;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorReport {
    pub submitted: usize,
    pub rejected: usize,
}

pub struct OrderGenerator {
    mean_gap_secs: f64,
}

impl OrderGenerator {
    /// `mean_traffic` is in orders per second. Non-positive rates fall back
    /// to one order per second.
    pub fn new(mean_traffic: f64) -> Self {
        let rate = if mean_traffic > 0.0 && mean_traffic.is_finite() {
            mean_traffic
        } else {
            1.0
        };
        Self {
            mean_gap_secs: 1.0 / rate,
        }
    }

    pub fn mean_gap(&self) -> Duration {
        Duration::from_secs_f64(self.mean_gap_secs)
    }

    /// Reads a JSON array of orders.
    pub fn read_orders(path: &Path) -> Result<Vec<OrderRequest>, KitchenError> {
        let file = File::open(path).map_err(|source| KitchenError::OrderSource {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn parse_orders(json: &str) -> Result<Vec<OrderRequest>, KitchenError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Draws the wait before the next order.
    pub fn sample_gap<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        // Inverse transform: -ln(U) * mean, with U in (0, 1].
        let u: f64 = 1.0 - rng.gen::<f64>();
        let secs = -u.ln() * self.mean_gap_secs;
        Duration::from_secs_f64(if secs > 0.0 { secs } else { 0.0 })
    }

    /// Submits every request, pausing a random gap before each.
    ///
    /// Invalid orders are logged and skipped. Stops with an error only when
    /// the kitchen is no longer accepting orders.
    pub async fn run(
        &self,
        requests: Vec<OrderRequest>,
        client: &KitchenClient,
    ) -> Result<GeneratorReport, KitchenError> {
        let total = requests.len();
        info!(
            orders = total,
            mean_gap_ms = self.mean_gap().as_millis() as u64,
            "Order generator started"
        );

        let mut report = GeneratorReport::default();
        for request in requests {
            let gap = self.sample_gap(&mut rand::thread_rng());
            tokio::time::sleep(gap).await;

            let name = request.name.clone();
            match client.submit_request(request).await {
                Ok(_) => report.submitted += 1,
                Err(KitchenError::Validation(e)) => {
                    warn!(name = %name, error = %e, "Skipping invalid order");
                    report.rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            submitted = report.submitted,
            rejected = report.rejected,
            "Order generator finished"
        );
        Ok(report)
    }
}
