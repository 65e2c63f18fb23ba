//! Byte-level encoding and decoding of [`Message`] payloads.

use byteorder::{BigEndian, ByteOrder};
use riglink_types::{Message, MessageKind, Payload};

use crate::error::ProtocolError;

/// Wire size of a binary-framed scalar reading.
pub const SCALAR_FRAME_LEN: usize = 4;

/// Serialize a message payload for transmission.
///
/// The payload sum type is matched exhaustively; there is no fallback
/// encoding for an unrepresentable payload because none can exist.
pub fn encode(message: &Message) -> Vec<u8> {
    match &message.payload {
        Payload::Text(text) => text.as_bytes().to_vec(),
        Payload::Scalar(value) => {
            let mut buf = [0u8; SCALAR_FRAME_LEN];
            BigEndian::write_f32(&mut buf, *value);
            buf.to_vec()
        }
        Payload::Sequence(points) => {
            let joined = points
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            joined.into_bytes()
        }
    }
}

/// Deserialize received bytes into a message of the expected kind.
///
/// For `SensorData`, a binary float unpack is attempted first: a datagram
/// of exactly [`SCALAR_FRAME_LEN`] bytes is taken as a big-endian f32, and
/// anything else falls back to UTF-8 text (the temperature and pressure
/// channels frame their readings as decimal text). Every other kind
/// decodes as UTF-8 text. Bytes that satisfy neither path are a
/// [`ProtocolError::Decode`], never a silent coercion.
pub fn decode(bytes: &[u8], expected: MessageKind) -> Result<Message, ProtocolError> {
    let payload = match expected {
        MessageKind::SensorData if bytes.len() == SCALAR_FRAME_LEN => {
            Payload::Scalar(BigEndian::read_f32(bytes))
        }
        _ => match std::str::from_utf8(bytes) {
            Ok(text) => Payload::Text(text.to_string()),
            Err(_) => return Err(ProtocolError::decode(bytes, expected)),
        },
    };

    Ok(Message::new(expected, payload))
}
