//! Outbound side of the PC: commands, waveforms, and the solenoid
//! command/ack exchange.
//!
//! Every call binds a short-lived ephemeral socket for that single
//! exchange. Concurrent callers therefore never share a socket, at the
//! cost of paying socket setup per send, acceptable at human command
//! rates.

use std::time::Duration;

use tracing::{info, warn};

use riglink_config::LinkConfig;
use riglink_types::{Message, MessageKind};

use crate::transport::UdpTransport;

/// Handles outgoing traffic from the PC to the remote devices.
#[derive(Debug, Clone)]
pub struct LinkClient {
    config: LinkConfig,
}

impl LinkClient {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    async fn ephemeral(&self, timeout: Duration) -> Option<UdpTransport> {
        match UdpTransport::bind_ephemeral(timeout, self.config.max_packet_size).await {
            Ok(transport) => Some(transport),
            Err(err) => {
                warn!(error = %err, "could not open outbound socket");
                None
            }
        }
    }

    /// Send a command to the control board. Fire and forget.
    pub async fn send_command(&self, command: &str) -> bool {
        let Some(transport) = self.ephemeral(self.config.socket_timeout()).await else {
            return false;
        };

        let mut message = Message::command(command);
        let sent = transport
            .send(&mut message, self.config.command_addr())
            .await;
        if sent {
            info!(command, "sent command");
        }
        sent
    }

    /// Send a waveform setpoint list to the control board.
    pub async fn send_waveform(&self, points: &[f64]) -> bool {
        let Some(transport) = self.ephemeral(self.config.socket_timeout()).await else {
            return false;
        };

        let mut message = Message::waveform(points.to_vec());
        let sent = transport
            .send(&mut message, self.config.waveform_addr())
            .await;
        if sent {
            info!(points = points.len(), "sent waveform");
        }
        sent
    }

    /// Send a command to the solenoid controller and wait for its
    /// acknowledgment.
    ///
    /// Single-shot: one send, one bounded receive, no retry. A failed
    /// send returns `None` immediately without waiting; a timeout or an
    /// undecodable reply is also `None`. Re-issuing is the caller's call.
    pub async fn send_solenoid_command(&self, command: &str, timeout: Duration) -> Option<String> {
        let transport = self.ephemeral(timeout).await?;

        let mut message = Message::command(command);
        if !transport
            .send(&mut message, self.config.solenoid_addr())
            .await
        {
            return None;
        }

        match transport.receive(MessageKind::Ack).await {
            Some(reply) => {
                let text = reply.as_text()?.to_string();
                info!(command, ack = %text, "solenoid command acknowledged");
                Some(text)
            }
            None => {
                warn!(command, "no acknowledgment from solenoid controller");
                None
            }
        }
    }
}
