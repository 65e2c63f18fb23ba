//! Device-side half of the link: the control board's receivers and its
//! telemetry send path.
//!
//! The board listens on two channels, commands (text) and waveform
//! setpoints (space-separated decimal floats), and streams readings back
//! to the PC. This module also ships the reference-to-drive mapping the
//! board applies before handing a waveform to the actuator.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use riglink_config::LinkConfig;
use riglink_types::{ChannelKind, Message, MessageKind};

use crate::error::Result;
use crate::receiver::{join_with_grace, run_receiver, StartReport};
use crate::transport::UdpTransport;

/// Handler for an inbound command string.
pub type CommandHandler = Arc<dyn Fn(String) + Send + Sync>;
/// Handler for a parsed waveform.
pub type WaveformHandler = Arc<dyn Fn(Vec<f64>) + Send + Sync>;

/// Drive output range of the board's PMOD current interface.
const DRIVE_MIN: f64 = 1.0;
const DRIVE_MAX: f64 = 99.0;

/// Linearly rescale a reference waveform into the actuator drive range.
///
/// A constant waveform has no span to scale and maps to all-minimum.
pub fn map_drive_range(reference: &[f64]) -> Vec<f64> {
    let Some(min) = reference.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = reference.iter().copied().fold(min, f64::max);

    if min == max {
        return vec![DRIVE_MIN; reference.len()];
    }

    reference
        .iter()
        .map(|&x| DRIVE_MIN + (DRIVE_MAX - DRIVE_MIN) * (x - min) / (max - min))
        .collect()
}

/// Manages the device side's inbound channels.
pub struct DeviceServer {
    config: LinkConfig,
    on_command: CommandHandler,
    on_waveform: WaveformHandler,
    shutdown: Option<watch::Sender<bool>>,
    tasks: Vec<(ChannelKind, JoinHandle<()>)>,
}

impl DeviceServer {
    pub fn new(
        config: LinkConfig,
        on_command: impl Fn(String) + Send + Sync + 'static,
        on_waveform: impl Fn(Vec<f64>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            on_command: Arc::new(on_command),
            on_waveform: Arc::new(on_waveform),
            shutdown: None,
            tasks: Vec::new(),
        }
    }

    /// Bind the command and waveform channels and spawn their receivers.
    pub async fn start(&mut self) -> StartReport {
        if self.shutdown.is_some() {
            warn!("device server already running");
            return StartReport::default();
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut report = StartReport::default();

        let channels = [
            (
                ChannelKind::Command,
                MessageKind::Command,
                self.config.command_tx_port,
            ),
            (
                ChannelKind::Waveform,
                MessageKind::Waveform,
                self.config.waveform_tx_port,
            ),
        ];

        for (kind, expected, port) in channels {
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
                    tracing::error!(channel = %kind, error = %err, "channel startup failed");
                    report.failed.push((kind, err));
                    continue;
                }
            };

            let on_command = Arc::clone(&self.on_command);
            let on_waveform = Arc::clone(&self.on_waveform);
            let handle = tokio::spawn(run_receiver(
                kind,
                expected,
                transport,
                shutdown_rx.clone(),
                move |message| dispatch(kind, message, &on_command, &on_waveform),
            ));

            self.tasks.push((kind, handle));
            report.started.push(kind);
        }

        self.shutdown = Some(shutdown_tx);
        report
    }

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

fn dispatch(
    kind: ChannelKind,
    message: &Message,
    on_command: &CommandHandler,
    on_waveform: &WaveformHandler,
) {
    let Some(text) = message.as_text() else {
        return;
    };

    match kind {
        ChannelKind::Command => on_command(text.to_string()),
        ChannelKind::Waveform => {
            let parsed: std::result::Result<Vec<f64>, _> =
                text.split_whitespace().map(str::parse::<f64>).collect();
            match parsed {
                Ok(points) if !points.is_empty() => on_waveform(points),
                Ok(_) => {}
                Err(err) => {
                    warn!(channel = %kind, payload = %text, error = %err, "invalid waveform data");
                }
            }
        }
        _ => {}
    }
}

/// Outbound telemetry from the device to the PC.
///
/// One socket, reused for the whole session; the framing per stream
/// matches what the PC-side receivers expect (binary float for coil
/// current, decimal text for temperature and pressure, `"value,status"`
/// for the solenoid line).
pub struct TelemetrySender {
    transport: UdpTransport,
    config: LinkConfig,
}

impl TelemetrySender {
    pub async fn new(config: LinkConfig) -> Result<Self> {
        let transport =
            UdpTransport::bind_ephemeral(config.socket_timeout(), config.max_packet_size).await?;
        Ok(Self { transport, config })
    }

    fn pc_addr(&self, port: u16) -> String {
        format!("{}:{}", self.config.local_host, port)
    }

    pub async fn send_coil_current(&self, value: f32) -> bool {
        let mut msg = Message::sensor(value);
        self.transport
            .send(&mut msg, self.pc_addr(self.config.coil_current_rx_port))
            .await
    }

    pub async fn send_temperature(&self, value: f64) -> bool {
        let mut msg = Message::sensor_text(format!("{value:.2}"));
        self.transport
            .send(&mut msg, self.pc_addr(self.config.temperature_rx_port))
            .await
    }

    pub async fn send_pressure(&self, value: f64) -> bool {
        let mut msg = Message::sensor_text(format!("{value:.2}"));
        self.transport
            .send(&mut msg, self.pc_addr(self.config.pressure_rx_port))
            .await
    }

    pub async fn send_solenoid(&self, pressure: f64, status: &str) -> bool {
        let mut msg = Message::sensor_text(format!("{pressure:.2},{status}"));
        self.transport
            .send(&mut msg, self.pc_addr(self.config.solenoid_telemetry_port()))
            .await
    }
}
