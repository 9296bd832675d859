//! Periodic measurement sweeps over the discovered sensors.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use sds011_protocol::{Command, Reading, SensorAddress};

use crate::exchange::exchange;
use crate::link::SensorLink;
use crate::sink::CsvSink;

/// A poller for the sensors bound to a single link.
///
/// Each link gets its own poller task, so a slow sensor delays only the
/// remaining sensors on its own wire, never another link's pass.
pub struct LinkPoller<L> {
    link: L,
    sensors: Vec<SensorAddress>,
    sink: Arc<CsvSink>,
    interval: Duration,
    timeout: Duration,
}

impl<L: SensorLink> LinkPoller<L> {
    pub fn new(
        link: L,
        sensors: Vec<SensorAddress>,
        sink: Arc<CsvSink>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            link,
            sensors,
            sink,
            interval,
            timeout,
        }
    }

    /// Run the polling loop: one pass immediately, then one per interval,
    /// until the task is aborted.
    pub async fn run(mut self) {
        info!(
            link = self.link.name(),
            sensors = self.sensors.len(),
            interval_secs = self.interval.as_secs(),
            "starting poller"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let accepted = self.pass_once().await;
            debug!(
                link = self.link.name(),
                accepted,
                sensors = self.sensors.len(),
                "pass complete"
            );
        }
    }

    /// One sweep: exactly one query per bound sensor, in bound order.
    /// Failed queries are logged and skipped; the next pass retries them
    /// naturally. Returns the number of accepted readings.
    async fn pass_once(&mut self) -> usize {
        let mut accepted = 0;

        for &addr in &self.sensors {
            let frame = Command::QueryData.frame(addr);

            match exchange(&mut self.link, &frame, addr, self.timeout).await {
                Ok(Reading::Measurement(m)) => {
                    debug!(
                        link = self.link.name(),
                        sensor = %addr,
                        pm25 = m.pm25,
                        pm10 = m.pm10,
                        "reading accepted"
                    );
                    match self.sink.append(&m).await {
                        Ok(()) => accepted += 1,
                        Err(e) => {
                            warn!(link = self.link.name(), sensor = %addr, "failed to record reading: {e}");
                        }
                    }
                }
                Ok(other) => {
                    warn!(link = self.link.name(), sensor = %addr, "unexpected reply: {other:?}");
                }
                Err(e) => {
                    warn!(link = self.link.name(), sensor = %addr, "query failed: {e}");
                }
            }
        }

        accepted
    }
}
