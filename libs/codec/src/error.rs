//! Protocol-level errors for message encoding and decoding.

use riglink_types::MessageKind;
use thiserror::Error;

/// Codec failures, with enough context to see what arrived on the wire.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// Raw bytes could not be decoded for the expected message kind.
    ///
    /// Carries the offending bytes so a receiver loop can log them at
    /// debug level without re-reading the socket.
    #[error("failed to decode {} byte(s) as {kind}", .bytes.len())]
    Decode { bytes: Vec<u8>, kind: MessageKind },
}

impl ProtocolError {
    pub fn decode(bytes: impl Into<Vec<u8>>, kind: MessageKind) -> Self {
        ProtocolError::Decode {
            bytes: bytes.into(),
            kind,
        }
    }
}
