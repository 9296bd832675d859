//! SDS011 particulate sensor logger.
//!
//! Opens every serial device matching the configured name pattern, probes
//! the configured sensor addresses once to learn which sensor sits on which
//! wire, then polls each bound sensor on a fixed interval and appends
//! accepted readings to a date-stamped CSV file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use sds011_logger::config::LoggerConfig;
use sds011_logger::discovery::discover_link;
use sds011_logger::link::{SensorLink, SerialLink, matching_ports};
use sds011_logger::poller::LinkPoller;
use sds011_logger::registry::AddressPool;
use sds011_logger::sink::CsvSink;

/// Logs particulate readings from SDS011 sensors on shared serial links.
#[derive(Parser, Debug)]
#[command(name = "sds011-logger")]
#[command(about = "Polls SDS011 particulate sensors and appends readings to a CSV file")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format)
    #[arg(short, long, default_value = "sds011.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = LoggerConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Initialize logging
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    sds011_logger::init_tracing(&level)?;

    info!("Starting sds011-logger");
    info!("Loaded configuration from {:?}", args.config);

    // Open the output file
    let csv_path = config.output.csv_path();
    let sink = Arc::new(
        CsvSink::open(&csv_path)
            .await
            .with_context(|| format!("Failed to open output file {csv_path:?}"))?,
    );
    info!(path = %sink.path().display(), "recording readings");

    // Open every serial device matching the pattern
    let ports =
        matching_ports(&config.serial.pattern).context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        anyhow::bail!(
            "no serial device matches pattern '{}'",
            config.serial.pattern
        );
    }

    // Probe each link for the configured sensors, all links in parallel.
    // Polling starts only after every link finishes its probe.
    let pool = Arc::new(AddressPool::new());
    let timeout = config.exchange_timeout();

    let mut discoveries = Vec::new();
    for path in ports {
        let mut link = SerialLink::open(&path, config.serial.baud_rate)
            .with_context(|| format!("Failed to open serial device {path}"))?;
        info!(link = %path, "serial device open");

        let pool = pool.clone();
        let addresses = config.sensors.clone();
        discoveries.push(tokio::spawn(async move {
            let bound = discover_link(&mut link, &addresses, &pool, timeout).await;
            (link, bound)
        }));
    }

    let mut pollers = Vec::new();
    let mut total = 0;
    for handle in discoveries {
        let (link, bound) = handle.await.context("discovery task failed")?;
        total += bound.len();
        if bound.is_empty() {
            warn!(link = link.name(), "no sensors found on link");
            continue;
        }
        pollers.push(LinkPoller::new(
            link,
            bound,
            sink.clone(),
            config.poll_interval(),
            timeout,
        ));
    }

    info!(
        sensors = total,
        configured = config.sensors.len(),
        "discovery complete on all links"
    );

    // One polling task per link, each sweeping its own sensors sequentially
    let mut tasks = Vec::new();
    for poller in pollers {
        tasks.push(tokio::spawn(poller.run()));
    }

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");

    // Abandon in-flight exchanges; records already accepted are on disk
    for task in tasks {
        task.abort();
    }

    Ok(())
}
