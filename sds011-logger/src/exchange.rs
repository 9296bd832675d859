//! Single request/response transaction over a link.
//!
//! A shared wire cannot tell interleaved frames apart, so exchanges on one
//! link are strictly sequential; taking the link by `&mut` makes a second
//! outstanding exchange unrepresentable.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, timeout_at};
use tracing::trace;

use sds011_protocol::{
    CommandFrame, ProtocolError, Reading, ResponseFrame, SensorAddress, decode, validate,
};

use crate::link::SensorLink;

/// Ways a single exchange can fail. All of them are recoverable at the
/// single-query granularity: the orchestrators log and move on.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// No acceptable response arrived within the bound.
    #[error("no valid response within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The underlying link failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// A well-formed frame arrived but did not decode to a known reading.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Send one command frame and await the matching response.
///
/// Chunks that are not exactly one response frame long, fail checksum
/// validation, or carry a different sensor's address are ignored and the
/// wait continues: other sensors on the same wire may emit frames while this
/// request is outstanding. `expected` set to the broadcast address accepts a
/// reply from any sensor. Exactly one of {reading, timeout, transport error}
/// resolves the exchange.
pub async fn exchange<L: SensorLink>(
    link: &mut L,
    frame: &CommandFrame,
    expected: SensorAddress,
    timeout: Duration,
) -> Result<Reading, ExchangeError> {
    link.send(frame).await?;

    let deadline = Instant::now() + timeout;
    loop {
        let chunk = match timeout_at(deadline, link.recv_chunk()).await {
            Err(_) => {
                return Err(ExchangeError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Ok(Err(e)) => return Err(ExchangeError::Transport(e)),
            Ok(Ok(chunk)) => chunk,
        };

        let Ok(response) = ResponseFrame::try_from(chunk.as_slice()) else {
            trace!(
                link = link.name(),
                len = chunk.len(),
                "ignoring chunk of unexpected length"
            );
            continue;
        };

        if !validate(&response) {
            trace!(link = link.name(), "ignoring frame with bad checksum");
            continue;
        }

        let reading = decode(&response)?;

        if !expected.is_broadcast() && reading.sensor() != expected {
            trace!(
                link = link.name(),
                from = %reading.sensor(),
                "ignoring reply from a different sensor"
            );
            continue;
        }

        return Ok(reading);
    }
}
