//! Response frame validation and decoding.
//!
//! Every reply from a sensor is exactly 10 bytes. Callers are expected to
//! check the length before converting a received chunk into a
//! [`ResponseFrame`]; [`decode`] itself only re-checks the checksum.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::address::SensorAddress;
use crate::error::ProtocolError;

/// Length of a response frame on the wire.
pub const RESPONSE_LEN: usize = 10;

/// A raw 10-byte response frame.
pub type ResponseFrame = [u8; RESPONSE_LEN];

/// Byte offsets within a response frame.
pub mod offset {
    /// Header byte, always 0xAA.
    pub const HEAD: usize = 0;
    /// Message type: 0xC0 (measurement) or 0xC5 (settings reply).
    pub const KIND: usize = 1;
    /// Settings sub-type for 0xC5 replies; first data byte otherwise.
    pub const SUB: usize = 2;
    /// First payload byte of the checksummed region.
    pub const DATA_START: usize = 2;
    /// Last payload byte of the checksummed region.
    pub const DATA_END: usize = 7;
    /// High byte of the replying sensor's address.
    pub const ADDR_HI: usize = 6;
    /// Low byte of the replying sensor's address.
    pub const ADDR_LO: usize = 7;
    /// Checksum over bytes DATA_START..=DATA_END.
    pub const CHECKSUM: usize = 8;
    /// Footer byte, always 0xAB.
    pub const TAIL: usize = 9;
}

const MEASUREMENT_REPLY: u8 = 0xC0;
const SETTINGS_REPLY: u8 = 0xC5;

const SUB_REPORTING_MODE: u8 = 0x02;
const SUB_DEVICE_ID: u8 = 0x05;
const SUB_FIRMWARE: u8 = 0x07;
const SUB_WORK_STATE: u8 = 0x08;

/// Check a response frame's checksum: sum of bytes 2..=7 mod 256 must equal
/// byte 8. This range is narrower than the command checksum range; the
/// asymmetry is part of the device protocol.
pub fn validate(frame: &ResponseFrame) -> bool {
    let sum = frame[offset::DATA_START..=offset::DATA_END]
        .iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b));
    sum == frame[offset::CHECKSUM]
}

/// Whether a sensor reports continuously or only when queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingMode {
    Active,
    Query,
}

/// Whether a sensor's fan and laser are running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    Sleeping,
    Working,
}

/// One accepted particulate measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub sensor: SensorAddress,
    /// PM2.5 concentration in µg/m³.
    pub pm25: f64,
    /// PM10 concentration in µg/m³.
    pub pm10: f64,
    /// Unix timestamp in seconds, taken when the frame was decoded.
    pub timestamp: i64,
}

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// Reply to `QueryData`.
    Measurement(Measurement),
    /// Reply to the reporting-mode commands.
    ReportingMode {
        sensor: SensorAddress,
        mode: ReportingMode,
    },
    /// Address-only acknowledgement.
    Id { sensor: SensorAddress },
    /// Reply to the sleep/work commands.
    WorkState {
        sensor: SensorAddress,
        state: WorkState,
    },
    /// Reply to `CheckFirmware`; version formatted as hex "month/day/year".
    Firmware {
        sensor: SensorAddress,
        version: String,
    },
}

impl Reading {
    /// Address of the sensor this reading came from.
    pub fn sensor(&self) -> SensorAddress {
        match self {
            Reading::Measurement(m) => m.sensor,
            Reading::ReportingMode { sensor, .. } => *sensor,
            Reading::Id { sensor } => *sensor,
            Reading::WorkState { sensor, .. } => *sensor,
            Reading::Firmware { sensor, .. } => *sensor,
        }
    }
}

/// Decode a checksum-valid response frame into a typed [`Reading`].
pub fn decode(frame: &ResponseFrame) -> Result<Reading, ProtocolError> {
    if !validate(frame) {
        return Err(ProtocolError::ChecksumInvalid);
    }

    let sensor = SensorAddress([frame[offset::ADDR_HI], frame[offset::ADDR_LO]]);

    match frame[offset::KIND] {
        MEASUREMENT_REPLY => Ok(Reading::Measurement(Measurement {
            sensor,
            pm25: f64::from(u16::from_le_bytes([frame[2], frame[3]])) / 10.0,
            pm10: f64::from(u16::from_le_bytes([frame[4], frame[5]])) / 10.0,
            timestamp: current_timestamp_secs(),
        })),
        SETTINGS_REPLY => match frame[offset::SUB] {
            SUB_REPORTING_MODE => Ok(Reading::ReportingMode {
                sensor,
                mode: if frame[4] == 0 {
                    ReportingMode::Active
                } else {
                    ReportingMode::Query
                },
            }),
            SUB_DEVICE_ID => Ok(Reading::Id { sensor }),
            SUB_FIRMWARE => Ok(Reading::Firmware {
                sensor,
                // Byte order fixed by the device: month, day, year.
                version: format!("{:X}/{:X}/{:X}", frame[5], frame[4], frame[3]),
            }),
            SUB_WORK_STATE => Ok(Reading::WorkState {
                sensor,
                state: if frame[4] == 0 {
                    WorkState::Sleeping
                } else {
                    WorkState::Working
                },
            }),
            sub => Err(ProtocolError::UnknownMessage {
                kind: frame[offset::KIND],
                sub,
            }),
        },
        kind => Err(ProtocolError::UnknownMessage {
            kind,
            sub: frame[offset::SUB],
        }),
    }
}

/// Current timestamp in seconds since the Unix epoch.
///
/// Returns 0 if system time is before the epoch (should never happen in
/// practice).
pub fn current_timestamp_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
