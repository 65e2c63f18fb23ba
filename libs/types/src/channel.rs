//! Fixed enumerations of the link's data streams and receiver channels.
//!
//! Channels used to be addressed by loosely-typed string tags
//! (`"tf_current"`, `"solenoid"`, ...). These enums close the set: the
//! buffer, the callback table, and the receiver loops all key on them, and
//! a misspelled channel is a compile error instead of a silent no-op.

use serde::{Deserialize, Serialize};

/// Sensor data streams held in the rolling buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStream {
    /// TF coil current, streamed as a binary float from the control board.
    CoilCurrent,
    /// Board temperature, streamed as decimal text.
    Temperature,
    /// Chamber pressure, streamed as decimal text.
    Pressure,
    /// Solenoid line pressure, carried in the `"value,status"` telemetry.
    SolenoidPressure,
}

impl SensorStream {
    /// All streams, in buffer layout order.
    pub const ALL: [SensorStream; 4] = [
        SensorStream::CoilCurrent,
        SensorStream::Temperature,
        SensorStream::Pressure,
        SensorStream::SolenoidPressure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStream::CoilCurrent => "coil_current",
            SensorStream::Temperature => "temperature",
            SensorStream::Pressure => "pressure",
            SensorStream::SolenoidPressure => "solenoid_pressure",
        }
    }
}

impl std::fmt::Display for SensorStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one receiver loop, PC side or device side.
///
/// Each kind is bound to exactly one UDP port and one payload convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// PC side: coil current readings (binary float).
    CoilCurrent,
    /// PC side: temperature readings (decimal text).
    Temperature,
    /// PC side: pressure readings (decimal text).
    Pressure,
    /// PC side: solenoid `"pressure,status"` telemetry.
    SolenoidTelemetry,
    /// Device side: inbound commands (text).
    Command,
    /// Device side: inbound waveform setpoints (space-separated text).
    Waveform,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::CoilCurrent => "coil_current",
            ChannelKind::Temperature => "temperature",
            ChannelKind::Pressure => "pressure",
            ChannelKind::SolenoidTelemetry => "solenoid_telemetry",
            ChannelKind::Command => "command",
            ChannelKind::Waveform => "waveform",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
