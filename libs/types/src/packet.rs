//! Transfer/display shape for a single sensor reading.

use serde::{Deserialize, Serialize};

/// One logical sensor reading, ready for display or hand-off.
///
/// Not persisted by the link core; downstream consumers (plotting, status
/// panels) receive these and decide what to do with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPacket {
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    pub status: String,
}

impl DataPacket {
    pub fn new(sensor_type: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            sensor_type: sensor_type.into(),
            value,
            unit: unit.into(),
            status: "OK".to_string(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

impl std::fmt::Display for DataPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {} ({})",
            self.sensor_type, self.value, self.unit, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_ok() {
        let packet = DataPacket::new("temperature", 25.0, "C");
        assert_eq!(packet.status, "OK");
        assert_eq!(packet.to_string(), "temperature: 25 C (OK)");
    }

    #[test]
    fn with_status_overrides_default() {
        let packet = DataPacket::new("solenoid_pressure", 30.5, "psi").with_status("OPEN");
        assert_eq!(packet.status, "OPEN");
    }
}
