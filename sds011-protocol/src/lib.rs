//! Wire protocol codec for the SDS011 particulate matter sensor.
//!
//! The SDS011 speaks a fixed-size binary protocol over a 9600 baud serial
//! line. Several sensors can share one wire; every frame carries the two-byte
//! address of the sensor it is for (or from). This crate covers the framing
//! only and does no I/O:
//!
//! - [`command`] - Command frame construction (19 bytes, checksummed)
//! - [`response`] - Response frame validation and decoding (10 bytes)
//! - [`address`] - Two-byte sensor addresses (`SensorAddress`)
//! - [`error`] - Error types

pub mod address;
pub mod command;
pub mod error;
pub mod response;

// Re-export commonly used types at the crate root
pub use address::SensorAddress;
pub use command::{COMMAND_LEN, Command, CommandFrame, checksum};
pub use error::ProtocolError;
pub use response::{
    Measurement, RESPONSE_LEN, Reading, ReportingMode, ResponseFrame, WorkState,
    current_timestamp_secs, decode, validate,
};
