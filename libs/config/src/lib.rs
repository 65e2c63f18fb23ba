//! # riglink Configuration
//!
//! Centralized endpoint table and settings for the control link. All peer
//! addresses are fixed `host:port` pairs chosen here; there is no runtime
//! renegotiation or discovery.
//!
//! Configuration is an explicitly constructed value handed to each
//! component at construction; nothing in the link reads ambient global
//! state. Binaries load it from a TOML file resolved via
//! `RIGLINK_CONFIG_PATH`, falling back to the built-in defaults when no
//! file is present.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "RIGLINK_CONFIG_PATH";

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "configs/riglink.toml";

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config file {path}: {reason}")]
    Invalid { path: String, reason: String },
}

/// Network configuration for the control link.
///
/// Defaults match the bench wiring: receivers bind on the local host,
/// the control board and the solenoid controller live on the device host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Address the PC-side receivers bind on.
    pub local_host: String,
    /// Address of the remote devices (control board and solenoid MCU).
    pub device_host: String,

    /// PC receives TF coil current readings here.
    pub coil_current_rx_port: u16,
    /// PC sends commands to the control board here.
    pub command_tx_port: u16,
    /// PC sends waveform setpoints here.
    pub waveform_tx_port: u16,
    /// PC receives temperature readings here.
    pub temperature_rx_port: u16,
    /// PC receives pressure readings here.
    pub pressure_rx_port: u16,
    /// Solenoid controller command/ack port; telemetry arrives on the
    /// next port up.
    pub solenoid_port: u16,

    /// Receive timeout per socket, in seconds.
    pub socket_timeout_secs: f64,
    /// Largest datagram read per receive.
    pub max_packet_size: usize,
    /// Capacity of each sensor ring buffer.
    pub buffer_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            local_host: "127.0.0.1".to_string(),
            device_host: "192.168.1.100".to_string(),
            coil_current_rx_port: 1200,
            command_tx_port: 1300,
            waveform_tx_port: 1400,
            temperature_rx_port: 1500,
            pressure_rx_port: 1600,
            solenoid_port: 2390,
            socket_timeout_secs: 1.0,
            max_packet_size: 1024,
            buffer_capacity: 100,
        }
    }
}

impl LinkConfig {
    /// Receive timeout as a [`Duration`].
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.socket_timeout_secs)
    }

    /// Solenoid telemetry port, derived from the control port.
    ///
    /// `load` rejects a `solenoid_port` of 65535, so the derived port
    /// cannot overflow for any loaded configuration.
    pub fn solenoid_telemetry_port(&self) -> u16 {
        self.solenoid_port + 1
    }

    /// Local bind address for a receiver on `port`.
    pub fn local_addr(&self, port: u16) -> String {
        format!("{}:{}", self.local_host, port)
    }

    /// Command TX endpoint on the control board.
    pub fn command_addr(&self) -> String {
        format!("{}:{}", self.device_host, self.command_tx_port)
    }

    /// Waveform TX endpoint on the control board.
    pub fn waveform_addr(&self) -> String {
        format!("{}:{}", self.device_host, self.waveform_tx_port)
    }

    /// Solenoid controller command/ack endpoint.
    pub fn solenoid_addr(&self) -> String {
        format!("{}:{}", self.device_host, self.solenoid_port)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        if config.solenoid_port == u16::MAX {
            return Err(ConfigError::Invalid {
                path: path.display().to_string(),
                reason: "solenoid_port must leave room for the telemetry port above it"
                    .to_string(),
            });
        }
        Ok(config)
    }

    /// Resolve the config path from the environment and load it, falling
    /// back to defaults when no file exists at the resolved path.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&path).exists() {
            info!(path = %path, "loading link configuration");
            Self::load(&path)
        } else {
            info!(path = %path, "no config file found, using defaults");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_the_bench_wiring() {
        let config = LinkConfig::default();
        assert_eq!(config.local_host, "127.0.0.1");
        assert_eq!(config.coil_current_rx_port, 1200);
        assert_eq!(config.solenoid_port, 2390);
        assert_eq!(config.solenoid_telemetry_port(), 2391);
        assert_eq!(config.socket_timeout(), Duration::from_secs(1));
        assert_eq!(config.max_packet_size, 1024);
        assert_eq!(config.buffer_capacity, 100);
    }

    #[test]
    fn addresses_combine_host_and_port() {
        let config = LinkConfig::default();
        assert_eq!(config.local_addr(1200), "127.0.0.1:1200");
        assert_eq!(config.command_addr(), "192.168.1.100:1300");
        assert_eq!(config.solenoid_addr(), "192.168.1.100:2390");
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "device_host = \"10.0.0.7\"\nsolenoid_port = 4000\nsocket_timeout_secs = 0.25"
        )
        .unwrap();

        let config = LinkConfig::load(file.path()).unwrap();
        assert_eq!(config.device_host, "10.0.0.7");
        assert_eq!(config.solenoid_port, 4000);
        assert_eq!(config.solenoid_telemetry_port(), 4001);
        assert_eq!(config.socket_timeout(), Duration::from_millis(250));
        // Untouched fields keep their defaults.
        assert_eq!(config.coil_current_rx_port, 1200);
        assert_eq!(config.local_host, "127.0.0.1");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "solenoid_port = \"not a port\"").unwrap();

        let err = LinkConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn topmost_solenoid_port_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "solenoid_port = 65535").unwrap();

        let err = LinkConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LinkConfig::load("/nonexistent/riglink.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
