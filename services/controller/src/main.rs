//! PC-side console controller.
//!
//! Starts the four inbound receiver channels, then reads commands from
//! stdin: validated commands are routed to the control board or, for the
//! solenoid category, through the command/ack exchange. `help` prints the
//! vocabulary, `exit` (or Ctrl-C) shuts the receivers down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use riglink_codec::{CommandCategory, CommandSet};
use riglink_config::LinkConfig;
use riglink_net::{ChannelCallbacks, LinkClient, LinkServer, SensorBuffer};
use riglink_types::DataPacket;

/// How long to wait for a solenoid acknowledgment.
const SOLENOID_ACK_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("starting riglink controller");

    let config = LinkConfig::from_env().context("failed to load link configuration")?;
    let buffer = Arc::new(SensorBuffer::new(config.buffer_capacity));

    // Console observers: print each reading as it arrives. Registered
    // before the receivers start and immutable afterwards.
    let callbacks = ChannelCallbacks::new()
        .on_coil_current(|value| {
            info!(reading = %DataPacket::new("coil_current", value, "A"), "sensor update")
        })
        .on_temperature(|value| {
            info!(reading = %DataPacket::new("temperature", value, "C"), "sensor update")
        })
        .on_pressure(|value| {
            info!(reading = %DataPacket::new("pressure", value, "psi"), "sensor update")
        })
        .on_solenoid(|pressure, status| {
            info!(
                reading = %DataPacket::new("solenoid_pressure", pressure, "psi").with_status(status),
                "sensor update"
            )
        });

    let mut server = LinkServer::new(config.clone(), Arc::clone(&buffer), callbacks);
    let report = server.start().await;
    for (channel, err) in &report.failed {
        warn!(%channel, error = %err, "channel unavailable for this session");
    }
    if report.started.is_empty() {
        anyhow::bail!("no receiver channel could be started");
    }

    let client = LinkClient::new(config);
    let commands = CommandSet::new();

    println!("riglink controller ready. Type `help` for commands, `exit` to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break; // stdin closed
                };
                if !handle_line(line.trim(), &commands, &client, &buffer).await {
                    break;
                }
            }
        }
    }

    server.stop().await;
    info!("riglink controller stopped");
    Ok(())
}

/// Process one console line. Returns `false` when the session should end.
async fn handle_line(
    line: &str,
    commands: &CommandSet,
    client: &LinkClient,
    buffer: &SensorBuffer,
) -> bool {
    if line.is_empty() {
        return true;
    }
    if line.eq_ignore_ascii_case("help") {
        println!("{}", commands.help_text());
        return true;
    }

    if !commands.validate(line) {
        warn!(command = line, "unrecognized command, try `help`");
        return true;
    }

    match commands.classify(line) {
        CommandCategory::Solenoid => {
            match client.send_solenoid_command(line, SOLENOID_ACK_TIMEOUT).await {
                Some(ack) => println!("solenoid: {ack}"),
                None => println!("solenoid: no response"),
            }
        }
        CommandCategory::System => {
            if line.eq_ignore_ascii_case("exit") {
                return false;
            }
            if line.eq_ignore_ascii_case("status") {
                print_status(buffer);
            }
            // `clear` empties the command history, which lives in the UI
            // layer; nothing to do here.
        }
        _ => {
            if !client.send_command(line).await {
                println!("send failed: {line}");
            }
        }
    }
    true
}

fn print_status(buffer: &SensorBuffer) {
    use riglink_types::SensorStream;

    for stream in SensorStream::ALL {
        match buffer.latest(stream) {
            Some(value) => println!("{stream}: {value}"),
            None => println!("{stream}: no data"),
        }
    }
    println!("solenoid_status: {}", buffer.solenoid_status());
}
