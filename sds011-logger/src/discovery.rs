//! Startup probe that binds each configured sensor to one link.

use std::time::Duration;

use tracing::{debug, info};

use sds011_protocol::{Command, SensorAddress};

use crate::exchange::exchange;
use crate::link::SensorLink;
use crate::registry::AddressPool;

/// Probe every configured address on one link, in list order, and return
/// the addresses that answered, in the order they were bound.
///
/// Runs once per link at startup; links probe concurrently with the claim
/// pool as the only shared state. Addresses already claimed by another link
/// are skipped without a probe. A successful query claims the address for
/// this link; losing the claim race to a concurrent link leaves the address
/// with the winner. Any failure is logged and the probe moves to the next
/// address, so a full probe takes at most `addresses.len()` timeouts.
pub async fn discover_link<L: SensorLink>(
    link: &mut L,
    addresses: &[SensorAddress],
    pool: &AddressPool,
    timeout: Duration,
) -> Vec<SensorAddress> {
    let mut bound = Vec::new();

    for &addr in addresses {
        if pool.is_claimed(addr).await {
            debug!(link = link.name(), sensor = %addr, "already bound elsewhere, skipping");
            continue;
        }

        let frame = Command::QueryData.frame(addr);
        match exchange(link, &frame, addr, timeout).await {
            Ok(_) => {
                if pool.claim(addr).await {
                    info!(link = link.name(), sensor = %addr, "sensor found");
                    bound.push(addr);
                } else {
                    debug!(link = link.name(), sensor = %addr, "lost claim race to another link");
                }
            }
            Err(e) => {
                debug!(link = link.name(), sensor = %addr, "no response: {e}");
            }
        }
    }

    info!(
        link = link.name(),
        sensors = bound.len(),
        "discovery complete"
    );
    bound
}
