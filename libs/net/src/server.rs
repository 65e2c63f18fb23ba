//! PC-side receiver loops.
//!
//! [`LinkServer`] owns one receiver task per inbound sensor channel:
//!
//! | Channel            | Port (default)       | Payload on the wire        |
//! |--------------------|----------------------|----------------------------|
//! | coil current       | 1200                 | 4-byte big-endian float    |
//! | temperature        | 1500                 | decimal text               |
//! | pressure           | 1600                 | decimal text               |
//! | solenoid telemetry | solenoid port + 1    | `"<pressure>,<status>"`    |
//!
//! Each task feeds the shared [`SensorBuffer`] and invokes the channel's
//! registered callback, if any. Callbacks are fixed before `start` and
//! immutable afterwards; registration happens-before the loops exist
//! because the table moves into the server at construction.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use riglink_config::LinkConfig;
use riglink_types::{ChannelKind, Message, MessageKind, Payload, SensorStream};

use crate::buffer::SensorBuffer;
use crate::receiver::{join_with_grace, run_receiver, StartReport};
use crate::transport::UdpTransport;

/// Observer for a plain numeric stream.
pub type SensorCallback = Arc<dyn Fn(f64) + Send + Sync>;
/// Observer for solenoid telemetry: pressure plus status.
pub type SolenoidCallback = Arc<dyn Fn(f64, &str) + Send + Sync>;

/// Optional observers, one slot per inbound channel.
///
/// Populated once before the server starts; the receiver loops only ever
/// read it.
#[derive(Clone, Default)]
pub struct ChannelCallbacks {
    pub coil_current: Option<SensorCallback>,
    pub temperature: Option<SensorCallback>,
    pub pressure: Option<SensorCallback>,
    pub solenoid: Option<SolenoidCallback>,
}

impl ChannelCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_coil_current(mut self, callback: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.coil_current = Some(Arc::new(callback));
        self
    }

    pub fn on_temperature(mut self, callback: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.temperature = Some(Arc::new(callback));
        self
    }

    pub fn on_pressure(mut self, callback: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.pressure = Some(Arc::new(callback));
        self
    }

    pub fn on_solenoid(mut self, callback: impl Fn(f64, &str) + Send + Sync + 'static) -> Self {
        self.solenoid = Some(Arc::new(callback));
        self
    }
}

/// Manages the PC side's inbound channels.
pub struct LinkServer {
    config: LinkConfig,
    buffer: Arc<SensorBuffer>,
    callbacks: ChannelCallbacks,
    shutdown: Option<watch::Sender<bool>>,
    tasks: Vec<(ChannelKind, JoinHandle<()>)>,
}

impl LinkServer {
    pub fn new(config: LinkConfig, buffer: Arc<SensorBuffer>, callbacks: ChannelCallbacks) -> Self {
        Self {
            config,
            buffer,
            callbacks,
            shutdown: None,
            tasks: Vec::new(),
        }
    }

    /// Shared handle to the buffer the receivers feed.
    pub fn buffer(&self) -> Arc<SensorBuffer> {
        Arc::clone(&self.buffer)
    }

    /// Bind every channel and spawn its receiver task.
    ///
    /// A channel whose port cannot be bound is reported in the result and
    /// skipped; the remaining channels start normally.
    pub async fn start(&mut self) -> StartReport {
        if self.shutdown.is_some() {
            warn!("link server already running");
            return StartReport::default();
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut report = StartReport::default();

        let channels = [
            (ChannelKind::CoilCurrent, self.config.coil_current_rx_port),
            (ChannelKind::Temperature, self.config.temperature_rx_port),
            (ChannelKind::Pressure, self.config.pressure_rx_port),
            (
                ChannelKind::SolenoidTelemetry,
                self.config.solenoid_telemetry_port(),
            ),
        ];

        for (kind, port) in channels {
            let addr = self.config.local_addr(port);
            let transport = match UdpTransport::bind(
                addr,
                self.config.socket_timeout(),
                self.config.max_packet_size,
            )
            .await
            {
                Ok(transport) => transport,
                Err(err) => {
                    error!(channel = %kind, error = %err, "channel startup failed");
                    report.failed.push((kind, err));
                    continue;
                }
            };

            let buffer = Arc::clone(&self.buffer);
            let callbacks = self.callbacks.clone();
            let handle = tokio::spawn(run_receiver(
                kind,
                MessageKind::SensorData,
                transport,
                shutdown_rx.clone(),
                move |message| ingest(kind, message, &buffer, &callbacks),
            ));

            self.tasks.push((kind, handle));
            report.started.push(kind);
        }

        self.shutdown = Some(shutdown_tx);
        report
    }

    /// Signal shutdown and await every receiver task with a bounded grace
    /// period. Tasks that overrun the grace are logged and abandoned.
    pub async fn stop(&mut self) {
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };
        let _ = shutdown.send(true);

        for (kind, handle) in self.tasks.drain(..) {
            join_with_grace(kind, handle).await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }
}

/// Parse one channel's payload and feed the buffer plus callback.
///
/// Malformed payloads are logged and dropped; one bad datagram must not
/// disturb the stream.
fn ingest(
    kind: ChannelKind,
    message: &Message,
    buffer: &SensorBuffer,
    callbacks: &ChannelCallbacks,
) {
    match kind {
        ChannelKind::CoilCurrent => {
            // Binary float framing; a text datagram that parses as a
            // number is accepted too, for bench tools that send decimals.
            let value = match &message.payload {
                Payload::Scalar(v) => f64::from(*v),
                Payload::Text(t) => match t.trim().parse::<f64>() {
                    Ok(v) => v,
                    Err(_) => {
                        warn!(channel = %kind, payload = %t, "invalid coil current data");
                        return;
                    }
                },
                Payload::Sequence(_) => return,
            };
            buffer.push(SensorStream::CoilCurrent, value);
            if let Some(callback) = &callbacks.coil_current {
                callback(value);
            }
        }
        ChannelKind::Temperature | ChannelKind::Pressure => {
            let (stream, callback) = if kind == ChannelKind::Temperature {
                (SensorStream::Temperature, &callbacks.temperature)
            } else {
                (SensorStream::Pressure, &callbacks.pressure)
            };

            let value = match &message.payload {
                Payload::Scalar(v) => f64::from(*v),
                Payload::Text(t) => match t.trim().parse::<f64>() {
                    Ok(v) => v,
                    Err(_) => {
                        warn!(channel = %kind, payload = %t, "invalid sensor data");
                        return;
                    }
                },
                Payload::Sequence(_) => return,
            };
            buffer.push(stream, value);
            if let Some(callback) = callback {
                callback(value);
            }
        }
        ChannelKind::SolenoidTelemetry => {
            let Some(text) = message.as_text() else {
                return;
            };
            // Wire form is "<pressure>,<status>".
            let mut parts = text.splitn(2, ',');
            let (Some(raw_pressure), Some(raw_status)) = (parts.next(), parts.next()) else {
                warn!(channel = %kind, payload = %text, "telemetry missing status field");
                return;
            };
            let Ok(pressure) = raw_pressure.trim().parse::<f64>() else {
                warn!(channel = %kind, payload = %text, "invalid solenoid pressure");
                return;
            };
            let status = raw_status.trim();

            buffer.push_solenoid(pressure, status);
            if let Some(callback) = &callbacks.solenoid {
                callback(pressure, status);
            }
        }
        // Device-side channels are not handled by this server.
        ChannelKind::Command | ChannelKind::Waveform => {}
    }
}
