//! Bench simulator for the remote devices.
//!
//! Stands in for the control board and the solenoid valve MCU during
//! bring-up: listens for commands and waveforms the way the board does,
//! answers solenoid commands with acks, and streams simulated telemetry
//! back at the PC-side receiver ports.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use riglink_config::LinkConfig;
use riglink_net::{map_drive_range, DeviceServer, TelemetrySender, UdpTransport};
use riglink_types::{Message, MessageKind};

/// Samples streamed per monitoring test command.
const TEST_SAMPLES: usize = 50;
/// Interval between simulated readings.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug)]
enum DeviceEvent {
    StartTemperatureTest,
    StartPressureTest,
    DriveWaveform(Vec<f64>),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("starting riglink device simulator");

    let config = LinkConfig::from_env().context("failed to load link configuration")?;
    let telemetry = Arc::new(
        TelemetrySender::new(config.clone())
            .await
            .context("failed to open telemetry socket")?,
    );

    // Receiver handlers are synchronous; they forward events to the
    // async side through this channel.
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let command_events = events_tx.clone();
    let waveform_events = events_tx;
    let mut server = DeviceServer::new(
        config.clone(),
        move |command| handle_command(&command, &command_events),
        move |points| {
            let _ = waveform_events.send(DeviceEvent::DriveWaveform(points));
        },
    );

    let report = server.start().await;
    if !report.all_started() {
        for (channel, err) in &report.failed {
            warn!(%channel, error = %err, "channel unavailable");
        }
        anyhow::bail!("device receivers could not be started");
    }

    let solenoid = tokio::spawn(solenoid_valve(config.clone()));

    info!("device simulator running, press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                dispatch_event(event, &telemetry);
            }
        }
    }

    info!("shutting down device simulator");
    solenoid.abort();
    server.stop().await;
    Ok(())
}

fn handle_command(command: &str, events: &mpsc::UnboundedSender<DeviceEvent>) {
    info!(command, "received command");

    match command.to_lowercase().as_str() {
        "temperature test" => {
            let _ = events.send(DeviceEvent::StartTemperatureTest);
        }
        "pressure test" => {
            let _ = events.send(DeviceEvent::StartPressureTest);
        }
        "start control loop" => info!("control loop armed, waiting for waveform"),
        "stop control loop" => info!("control loop stopped"),
        other => warn!(command = other, "unknown command"),
    }
}

fn dispatch_event(event: DeviceEvent, telemetry: &Arc<TelemetrySender>) {
    match event {
        DeviceEvent::StartTemperatureTest => {
            let telemetry = Arc::clone(telemetry);
            tokio::spawn(async move {
                info!("streaming simulated temperature");
                let mut rng = rand::rngs::OsRng;
                for _ in 0..TEST_SAMPLES {
                    let reading = 25.0 + rng.gen_range(-0.5..2.5);
                    telemetry.send_temperature(reading).await;
                    tokio::time::sleep(SAMPLE_INTERVAL).await;
                }
            });
        }
        DeviceEvent::StartPressureTest => {
            let telemetry = Arc::clone(telemetry);
            tokio::spawn(async move {
                info!("streaming simulated pressure");
                let mut rng = rand::rngs::OsRng;
                for _ in 0..TEST_SAMPLES {
                    let reading = 14.7 + rng.gen_range(-0.2..0.2);
                    telemetry.send_pressure(reading).await;
                    tokio::time::sleep(SAMPLE_INTERVAL).await;
                }
            });
        }
        DeviceEvent::DriveWaveform(points) => {
            let telemetry = Arc::clone(telemetry);
            tokio::spawn(async move {
                let drive = map_drive_range(&points);
                info!(points = drive.len(), "driving coil current waveform");
                for value in drive {
                    telemetry.send_coil_current(value as f32).await;
                    tokio::time::sleep(SAMPLE_INTERVAL).await;
                }
            });
        }
    }
}

/// Mock solenoid valve MCU: acks every command and reports its state on
/// the telemetry port.
async fn solenoid_valve(config: LinkConfig) {
    let addr = config.local_addr(config.solenoid_port);
    let transport = match UdpTransport::bind(
        addr,
        config.socket_timeout(),
        config.max_packet_size,
    )
    .await
    {
        Ok(transport) => transport,
        Err(err) => {
            warn!(error = %err, "solenoid mock could not bind, disabled");
            return;
        }
    };

    let telemetry = match TelemetrySender::new(config.clone()).await {
        Ok(telemetry) => telemetry,
        Err(err) => {
            warn!(error = %err, "solenoid mock has no telemetry socket, disabled");
            return;
        }
    };

    let mut status = "CLOSED".to_string();
    let mut pressure = 0.0f64;

    loop {
        let Some(message) = transport.receive(MessageKind::Command).await else {
            continue;
        };
        let Some(command) = message.as_text() else {
            continue;
        };

        let reply = match command.to_lowercase().as_str() {
            "solenoid open" => {
                status = "OPEN".to_string();
                pressure = 25.0;
                "OK: valve open".to_string()
            }
            "solenoid close" => {
                status = "CLOSED".to_string();
                pressure = 0.0;
                "OK: valve closed".to_string()
            }
            "solenoid pressure" => format!("PRESSURE: {pressure:.2}"),
            "solenoid test" => "OK: solenoid ready".to_string(),
            timing if timing.starts_with("solenoid time ") => "OK: timing set".to_string(),
            other => format!("ERR: unknown command {other}"),
        };

        if let Some(sender) = &message.sender {
            let mut ack = Message::ack(reply);
            transport.send(&mut ack, sender.as_str()).await;
        }
        telemetry.send_solenoid(pressure, &status).await;
    }
}
