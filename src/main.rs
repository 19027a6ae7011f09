use anyhow::Result;
use clap::Parser;
use oneview_exporter::{
    collectors, config::Settings, metrics::ExporterMetrics, server::start_server,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// OneView Exporter - Prometheus metrics exporter for HPE OneView
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?;

    init_logging(&settings.exporter.log_level)?;

    info!("Starting OneView Exporter");
    info!("OneView endpoint: {}", settings.oneview.endpoint);
    info!("Listen address: {}", settings.exporter.listen_address);

    let metrics = ExporterMetrics::new()?;
    info!("Metrics registry initialized");

    let _collectors = collectors::spawn_all(&settings, &metrics)?;
    info!(
        "Collectors started (inventory every {}s, utilization every {}s)",
        settings.collector.inventory_interval_seconds,
        settings.collector.utilization_interval_seconds
    );

    if let Err(e) = start_server(&settings.exporter.listen_address, metrics).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Initialize structured logging with tracing.
fn init_logging(log_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
