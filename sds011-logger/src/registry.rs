//! Sensor-to-link ownership.

use std::collections::HashSet;

use tokio::sync::Mutex;

use sds011_protocol::SensorAddress;

/// The set of sensor addresses already bound to some link.
///
/// Shared by every discovery task. An address can be claimed exactly once,
/// so a sensor never ends up bound to two links even when links probe
/// overlapping address sets concurrently. After discovery the pool is no
/// longer written; each poller only reads its own bound list.
#[derive(Debug, Default)]
pub struct AddressPool {
    claimed: Mutex<HashSet<SensorAddress>>,
}

impl AddressPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the address is already owned by some link.
    pub async fn is_claimed(&self, addr: SensorAddress) -> bool {
        self.claimed.lock().await.contains(&addr)
    }

    /// Claim the address for the calling link. Returns false when another
    /// link already owns it.
    pub async fn claim(&self, addr: SensorAddress) -> bool {
        self.claimed.lock().await.insert(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let pool = AddressPool::new();
        let addr = SensorAddress([0x15, 0xD5]);

        assert!(!pool.is_claimed(addr).await);
        assert!(pool.claim(addr).await);
        assert!(pool.is_claimed(addr).await);
        assert!(!pool.claim(addr).await);
    }
}
