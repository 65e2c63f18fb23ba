//! Message format shared by every channel of the control link.
//!
//! A [`Message`] is one UDP datagram's worth of meaning: a kind tag, a
//! payload, and optional bookkeeping (timestamp, sender, sequence id)
//! stamped by the transport layer rather than by the producer.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Kinds of messages exchanged between the PC and the remote devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Textual command for the control board or the solenoid controller.
    Command,
    /// Waveform setpoint list pushed to the control board.
    Waveform,
    /// Sensor reading streamed from a remote device.
    SensorData,
    /// Free-form status report.
    Status,
    /// Acknowledgment reply to a command.
    Ack,
    /// Error report from a remote device.
    Error,
}

impl MessageKind {
    /// Short lowercase name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Command => "command",
            MessageKind::Waveform => "waveform",
            MessageKind::SensorData => "sensor_data",
            MessageKind::Status => "status",
            MessageKind::Ack => "acknowledgment",
            MessageKind::Error => "error",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload carried by a [`Message`].
///
/// A closed sum type: every encode/decode site matches all three variants,
/// so an unrepresentable payload cannot reach the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// UTF-8 text (commands, acks, status, text-framed sensor values).
    Text(String),
    /// Single reading, framed as a 4-byte big-endian IEEE-754 float.
    Scalar(f32),
    /// Ordered numeric setpoints (waveforms), framed as space-separated
    /// decimal text.
    Sequence(Vec<f64>),
}

/// Standard message format for system communication.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub payload: Payload,
    /// Receipt time, stamped by the transport on successful receive.
    pub timestamp: Option<SystemTime>,
    /// Peer address as `"host:port"`, stamped by the transport on receive.
    pub sender: Option<String>,
    /// Monotonic per-transport counter, stamped at send time if absent.
    pub sequence_id: Option<u64>,
}

impl Message {
    pub fn new(kind: MessageKind, payload: Payload) -> Self {
        Self {
            kind,
            payload,
            timestamp: None,
            sender: None,
            sequence_id: None,
        }
    }

    /// Textual command message.
    pub fn command(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Command, Payload::Text(text.into()))
    }

    /// Single sensor reading.
    pub fn sensor(value: f32) -> Self {
        Self::new(MessageKind::SensorData, Payload::Scalar(value))
    }

    /// Text-framed sensor reading (temperature/pressure channels and the
    /// solenoid `"value,status"` telemetry use text on the wire).
    pub fn sensor_text(text: impl Into<String>) -> Self {
        Self::new(MessageKind::SensorData, Payload::Text(text.into()))
    }

    /// Waveform setpoint list.
    pub fn waveform(points: Vec<f64>) -> Self {
        Self::new(MessageKind::Waveform, Payload::Sequence(points))
    }

    /// Acknowledgment reply.
    pub fn ack(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Ack, Payload::Text(text.into()))
    }

    /// Payload as text, if it is the text variant.
    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Payload as a single numeric value, if it is the scalar variant.
    pub fn as_scalar(&self) -> Option<f32> {
        match &self.payload {
            Payload::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_tag_the_right_kind() {
        assert_eq!(Message::command("status").kind, MessageKind::Command);
        assert_eq!(Message::sensor(1.5).kind, MessageKind::SensorData);
        assert_eq!(Message::waveform(vec![0.0, 1.0]).kind, MessageKind::Waveform);
        assert_eq!(Message::ack("OK").kind, MessageKind::Ack);
    }

    #[test]
    fn payload_accessors_reject_other_variants() {
        let msg = Message::sensor(23.5);
        assert_eq!(msg.as_scalar(), Some(23.5));
        assert_eq!(msg.as_text(), None);

        let msg = Message::command("clear");
        assert_eq!(msg.as_text(), Some("clear"));
        assert_eq!(msg.as_scalar(), None);
    }

    #[test]
    fn bookkeeping_fields_start_unset() {
        let msg = Message::command("status");
        assert!(msg.timestamp.is_none());
        assert!(msg.sender.is_none());
        assert!(msg.sequence_id.is_none());
    }
}
