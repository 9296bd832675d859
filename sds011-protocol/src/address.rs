use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::ProtocolError;

/// Two-byte identifier of a sensor on a shared serial wire.
///
/// The address is printed on the sensor's barcode label: the "15D5" in
/// "5001-15D5" is the address `[0x15, 0xD5]`. Addresses are written and
/// compared as four uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorAddress(pub [u8; 2]);

impl SensorAddress {
    /// Address accepted by every sensor on the wire.
    pub const BROADCAST: SensorAddress = SensorAddress([0xFF, 0xFF]);

    /// Whether this is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Display for SensorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.0[0], self.0[1])
    }
}

impl FromStr for SensorAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 {
            return Err(ProtocolError::InvalidAddress(s.to_string()));
        }
        let raw = u16::from_str_radix(s, 16)
            .map_err(|_| ProtocolError::InvalidAddress(s.to_string()))?;
        Ok(SensorAddress(raw.to_be_bytes()))
    }
}

impl Serialize for SensorAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SensorAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
