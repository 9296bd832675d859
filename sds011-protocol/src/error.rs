use thiserror::Error;

/// Errors produced while decoding frames or parsing addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The response frame's checksum byte does not match its payload.
    #[error("response checksum mismatch")]
    ChecksumInvalid,

    /// The frame is checksum-valid but its type or sub-type byte is not
    /// part of the known command set.
    #[error("unrecognized message (type {kind:#04X}, sub-type {sub:#04X})")]
    UnknownMessage { kind: u8, sub: u8 },

    /// A sensor address string was not four hex digits.
    #[error("invalid sensor address '{0}': expected 4 hex digits")]
    InvalidAddress(String),
}
