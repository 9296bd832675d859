//! Command frame construction.
//!
//! A command occupies exactly 19 bytes on the wire. The checksum lives at a
//! reserved offset inside the frame, so [`Command::frame`] returns a fully
//! finalized frame: there is no separate "append the checksum" step a caller
//! could forget.

use crate::address::SensorAddress;

/// Length of a command frame on the wire.
pub const COMMAND_LEN: usize = 19;

/// A finalized command frame, checksum included.
pub type CommandFrame = [u8; COMMAND_LEN];

/// Byte offsets within a command frame.
pub mod offset {
    /// Header byte, always 0xAA.
    pub const HEAD: usize = 0;
    /// Direction marker, 0xB4 for host-to-sensor.
    pub const MARKER: usize = 1;
    /// Command selector byte.
    pub const KIND: usize = 2;
    /// First parameter byte.
    pub const PARAM1: usize = 3;
    /// Second parameter byte.
    pub const PARAM2: usize = 4;
    /// High byte of the target sensor address.
    pub const ADDR_HI: usize = 15;
    /// Low byte of the target sensor address.
    pub const ADDR_LO: usize = 16;
    /// Checksum over bytes KIND..=ADDR_LO.
    pub const CHECKSUM: usize = 17;
    /// Footer byte, always 0xAB.
    pub const TAIL: usize = 18;
}

const HEAD_BYTE: u8 = 0xAA;
const MARKER_BYTE: u8 = 0xB4;
const TAIL_BYTE: u8 = 0xAB;

/// Sum of the data bytes of a command frame (offsets 2..=16), modulo 256.
///
/// Note this range differs from the response checksum range; both are fixed
/// by the device protocol.
pub fn checksum(frame: &CommandFrame) -> u8 {
    frame[offset::KIND..=offset::ADDR_LO]
        .iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// The closed command set understood by the sensor.
///
/// The reporting period of [`Command::SetReportingPeriod`] is clamped to
/// 0..=30 minutes, the range the device accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask for the current PM2.5/PM10 measurement.
    QueryData,
    /// Ask whether the sensor reports actively or on query.
    GetReportingMode,
    /// Put the sensor in query mode (report only when asked).
    SetQueryMode,
    /// Put the sensor in active mode (report continuously).
    SetActiveMode,
    /// Ask whether the sensor is sleeping or working.
    GetWorkState,
    /// Stop the fan and laser.
    Sleep,
    /// Resume measuring.
    WakeUp,
    /// Set the reporting period in minutes, clamped to 0..=30.
    SetReportingPeriod(i32),
    /// Ask for the firmware version.
    CheckFirmware,
}

impl Command {
    /// Build the finalized frame for this command, addressed to one sensor.
    pub fn frame(&self, addr: SensorAddress) -> CommandFrame {
        let mut frame = [0u8; COMMAND_LEN];
        frame[offset::HEAD] = HEAD_BYTE;
        frame[offset::MARKER] = MARKER_BYTE;
        frame[offset::ADDR_HI] = addr.0[0];
        frame[offset::ADDR_LO] = addr.0[1];
        frame[offset::TAIL] = TAIL_BYTE;

        match *self {
            Command::QueryData => {
                frame[offset::KIND] = 0x04;
            }
            Command::GetReportingMode => {
                frame[offset::KIND] = 0x02;
            }
            Command::SetQueryMode => {
                frame[offset::KIND] = 0x02;
                frame[offset::PARAM1] = 0x01;
            }
            Command::SetActiveMode => {
                frame[offset::KIND] = 0x02;
                frame[offset::PARAM1] = 0x01;
                frame[offset::PARAM2] = 0x01;
            }
            Command::GetWorkState => {
                frame[offset::KIND] = 0x06;
            }
            Command::Sleep => {
                frame[offset::KIND] = 0x06;
                frame[offset::PARAM1] = 0x01;
            }
            Command::WakeUp => {
                frame[offset::KIND] = 0x06;
                frame[offset::PARAM1] = 0x01;
                frame[offset::PARAM2] = 0x01;
            }
            Command::SetReportingPeriod(minutes) => {
                frame[offset::KIND] = 0x08;
                frame[offset::PARAM1] = 0x01;
                frame[offset::PARAM2] = minutes.clamp(0, 30) as u8;
            }
            Command::CheckFirmware => {
                frame[offset::KIND] = 0x07;
            }
        }

        frame[offset::CHECKSUM] = checksum(&frame);
        frame
    }

    /// Build the finalized frame addressed to every sensor on the wire.
    pub fn broadcast_frame(&self) -> CommandFrame {
        self.frame(SensorAddress::BROADCAST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_data_frame_layout() {
        let frame = Command::QueryData.broadcast_frame();
        // AA B4 04 .. 00 .. FF FF ck AB
        assert_eq!(frame[offset::HEAD], 0xAA);
        assert_eq!(frame[offset::MARKER], 0xB4);
        assert_eq!(frame[offset::KIND], 0x04);
        assert_eq!(&frame[offset::PARAM1..offset::ADDR_HI], &[0u8; 12]);
        assert_eq!(frame[offset::ADDR_HI], 0xFF);
        assert_eq!(frame[offset::ADDR_LO], 0xFF);
        // 0x04 + 0xFF + 0xFF = 0x202, mod 256 = 0x02
        assert_eq!(frame[offset::CHECKSUM], 0x02);
        assert_eq!(frame[offset::TAIL], 0xAB);
    }

    #[test]
    fn test_addressed_frame_carries_address() {
        let frame = Command::QueryData.frame(SensorAddress([0x17, 0x68]));
        assert_eq!(frame[offset::ADDR_HI], 0x17);
        assert_eq!(frame[offset::ADDR_LO], 0x68);
    }

    #[test]
    fn test_reporting_period_clamped() {
        let frame = Command::SetReportingPeriod(-5).broadcast_frame();
        assert_eq!(frame[offset::PARAM2], 0);

        let frame = Command::SetReportingPeriod(99).broadcast_frame();
        assert_eq!(frame[offset::PARAM2], 30);

        let frame = Command::SetReportingPeriod(7).broadcast_frame();
        assert_eq!(frame[offset::PARAM2], 7);
    }

    #[test]
    fn test_command_bytes() {
        let cases = [
            (Command::QueryData, [0x04, 0x00, 0x00]),
            (Command::GetReportingMode, [0x02, 0x00, 0x00]),
            (Command::SetQueryMode, [0x02, 0x01, 0x00]),
            (Command::SetActiveMode, [0x02, 0x01, 0x01]),
            (Command::GetWorkState, [0x06, 0x00, 0x00]),
            (Command::Sleep, [0x06, 0x01, 0x00]),
            (Command::WakeUp, [0x06, 0x01, 0x01]),
            (Command::SetReportingPeriod(5), [0x08, 0x01, 0x05]),
            (Command::CheckFirmware, [0x07, 0x00, 0x00]),
        ];

        for (command, expected) in cases {
            let frame = command.broadcast_frame();
            assert_eq!(
                &frame[offset::KIND..=offset::PARAM2],
                &expected,
                "{command:?}"
            );
        }
    }
}
