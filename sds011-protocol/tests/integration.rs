//! Integration tests for the sds011-protocol codec.

use sds011_protocol::command::offset;
use sds011_protocol::{
    COMMAND_LEN, Command, ProtocolError, Reading, SensorAddress, checksum, decode, validate,
};

const ALL_COMMANDS: [Command; 9] = [
    Command::QueryData,
    Command::GetReportingMode,
    Command::SetQueryMode,
    Command::SetActiveMode,
    Command::GetWorkState,
    Command::Sleep,
    Command::WakeUp,
    Command::SetReportingPeriod(12),
    Command::CheckFirmware,
];

#[test]
fn test_every_command_frame_is_checksum_valid() {
    let addresses = [
        SensorAddress([0x15, 0xD5]),
        SensorAddress([0x17, 0x68]),
        SensorAddress([0x00, 0x01]),
        SensorAddress::BROADCAST,
    ];

    for command in ALL_COMMANDS {
        for addr in addresses {
            let frame = command.frame(addr);
            assert_eq!(frame.len(), COMMAND_LEN);
            assert_eq!(
                frame[offset::CHECKSUM],
                checksum(&frame),
                "{command:?} to {addr}"
            );

            // Recompute the sum independently over the protocol-defined range.
            let sum = frame[2..=16].iter().map(|b| u32::from(*b)).sum::<u32>();
            assert_eq!(frame[offset::CHECKSUM], (sum % 256) as u8);
        }
    }
}

#[test]
fn test_every_command_frame_has_fixed_envelope() {
    for command in ALL_COMMANDS {
        let frame = command.frame(SensorAddress([0x15, 0xD5]));
        assert_eq!(frame[0], 0xAA, "{command:?}");
        assert_eq!(frame[1], 0xB4, "{command:?}");
        assert_eq!(frame[15], 0x15, "{command:?}");
        assert_eq!(frame[16], 0xD5, "{command:?}");
        assert_eq!(frame[18], 0xAB, "{command:?}");
    }
}

#[test]
fn test_measurement_reply_decodes_to_scaled_values() {
    // Reply from sensor 1768: raw PM2.5 = 0x012C = 300, raw PM10 = 0x0052 = 82.
    let mut frame = [
        0xAA, 0xC0, 0x2C, 0x01, 0x52, 0x00, 0x17, 0x68, 0x00, 0xAB,
    ];
    frame[8] = frame[2..8].iter().fold(0u8, |s, b| s.wrapping_add(*b));

    assert!(validate(&frame));
    match decode(&frame).unwrap() {
        Reading::Measurement(m) => {
            assert_eq!(m.pm25, 30.0);
            assert_eq!(m.pm10, 8.2);
            assert_eq!(m.sensor, SensorAddress([0x17, 0x68]));
        }
        other => panic!("expected measurement, got {other:?}"),
    }
}

#[test]
fn test_corrupted_reply_is_rejected_everywhere() {
    let mut frame = [
        0xAA, 0xC0, 0x2C, 0x01, 0x52, 0x00, 0x17, 0x68, 0x00, 0xAB,
    ];
    frame[8] = frame[2..8].iter().fold(0u8, |s, b| s.wrapping_add(*b));
    // Flip one payload bit without fixing the checksum.
    frame[3] ^= 0x10;

    assert!(!validate(&frame));
    assert_eq!(decode(&frame), Err(ProtocolError::ChecksumInvalid));
}
