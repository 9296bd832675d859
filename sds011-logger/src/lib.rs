//! Multi-link SDS011 particulate sensor logger.
//!
//! Several SDS011 sensors can share one serial wire; each carries a unique
//! two-byte address. This daemon opens every serial device matching a name
//! pattern, probes the configured addresses once to learn which sensor sits
//! on which wire, then queries each bound sensor on a fixed interval and
//! appends accepted readings to a CSV file:
//!
//! - [`config`] - JSON5 configuration loading and validation
//! - [`link`] - Serial link abstraction (one duplex byte stream per wire)
//! - [`exchange`] - Single request/response transaction with timeout
//! - [`registry`] - Sensor-to-link ownership
//! - [`discovery`] - Startup probe that builds the registry
//! - [`poller`] - Periodic measurement sweeps
//! - [`sink`] - Append-only CSV output

pub mod config;
pub mod discovery;
pub mod exchange;
pub mod link;
pub mod poller;
pub mod registry;
pub mod sink;

pub use config::LoggerConfig;
pub use exchange::{ExchangeError, exchange};
pub use link::{SensorLink, SerialLink};
pub use poller::LinkPoller;
pub use registry::AddressPool;
pub use sink::CsvSink;

/// Initialize tracing with the given level, honoring `RUST_LOG` when set.
pub fn init_tracing(level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))
}
