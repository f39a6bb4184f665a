use clap::Parser;
use kitchen_framework::tracing::setup_tracing;
use kitchen_sync::generator::OrderGenerator;
use kitchen_sync::lifecycle::{KitchenConfig, KitchenSystem};
use kitchen_sync::shelf_manager::LogSink;
use kitchen_sync::KitchenError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};

/// Replays an order file through a simulated kitchen.
#[derive(Debug, Parser)]
#[command(name = "kitchen-sync", version, about)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "KITCHEN_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of orders. Overrides `generator.source-path`.
    #[arg(short, long)]
    orders: Option<PathBuf>,

    /// Average orders per second. Overrides `generator.mean-traffic`.
    #[arg(long)]
    mean_traffic: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), KitchenError> {
    setup_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => KitchenConfig::load(path)?,
        None => KitchenConfig::default(),
    };
    if let Some(orders) = args.orders {
        config.generator.source_path = Some(orders);
    }
    if let Some(mean_traffic) = args.mean_traffic {
        config.generator.mean_traffic = mean_traffic;
    }
    config.validate()?;

    let requests = match &config.generator.source_path {
        Some(path) => OrderGenerator::read_orders(path)?,
        None => {
            info!("No order file given, nothing to replay");
            Vec::new()
        }
    };

    let system = KitchenSystem::new(&config, Arc::new(LogSink));
    let generator = OrderGenerator::new(config.generator.mean_traffic);

    let span = tracing::info_span!("order_replay");
    let report = generator
        .run(requests, &system.client)
        .instrument(span)
        .await?;
    info!(submitted = report.submitted, rejected = report.rejected, "Replay complete");

    // Give the last couriers time to arrive.
    let last_courier = Duration::from_secs(config.driver_max_arrival_secs + 1);
    info!(wait_secs = last_courier.as_secs(), "Waiting for couriers");
    tokio::time::sleep(last_courier).await;

    let stats = system.shutdown().await?;
    info!(?stats, "Application completed successfully");
    Ok(())
}
