//! UDP transport wrapper: one socket, sequence stamping, bounded receive.
//!
//! The contract at this layer is deliberately forgiving. `send` reports
//! failure as `false` and `receive` reports both timeouts and undecodable
//! datagrams as `None`; the detail goes to the log. Receiver loops above
//! must stay alive indefinitely, so nothing here returns an error they
//! would have to handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime};

use bytes::BytesMut;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, error};

use riglink_codec::{decode, encode};
use riglink_types::{Message, MessageKind};

use crate::error::{NetworkError, Result};

/// Transport activity counters.
#[derive(Debug, Clone, Default)]
pub struct TransportStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Send failures, receive failures and swallowed decode errors.
    pub errors: u64,
    pub last_activity: Option<Instant>,
}

/// One UDP socket with the link's framing conventions applied.
pub struct UdpTransport {
    socket: UdpSocket,
    receive_timeout: Duration,
    max_packet_size: usize,
    sequence: AtomicU64,
    recv_buffer: tokio::sync::Mutex<BytesMut>,
    stats: parking_lot::Mutex<TransportStats>,
}

impl UdpTransport {
    /// Bind a transport on `addr`.
    ///
    /// Binding is the one operation here that surfaces an error: a port
    /// that cannot be bound must abort the owning channel's startup.
    pub async fn bind(
        addr: impl ToSocketAddrs + std::fmt::Display,
        receive_timeout: Duration,
        max_packet_size: usize,
    ) -> Result<Self> {
        let display = addr.to_string();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| NetworkError::bind(display, source))?;

        Ok(Self {
            socket,
            receive_timeout,
            max_packet_size,
            sequence: AtomicU64::new(0),
            recv_buffer: tokio::sync::Mutex::new(BytesMut::with_capacity(max_packet_size)),
            stats: parking_lot::Mutex::new(TransportStats::default()),
        })
    }

    /// Bind an ephemeral transport for a single outbound exchange.
    pub async fn bind_ephemeral(receive_timeout: Duration, max_packet_size: usize) -> Result<Self> {
        Self::bind("0.0.0.0:0", receive_timeout, max_packet_size).await
    }

    /// Send one message to `addr` as a single datagram.
    ///
    /// Stamps a monotonic `sequence_id` if the message carries none.
    /// Returns `false` (after an error log) on any transport failure;
    /// never an error the caller has to propagate.
    pub async fn send(
        &self,
        message: &mut Message,
        addr: impl ToSocketAddrs + std::fmt::Display,
    ) -> bool {
        if message.sequence_id.is_none() {
            message.sequence_id = Some(self.sequence.fetch_add(1, Ordering::Relaxed));
        }

        let target = addr.to_string();
        let data = encode(message);
        match self.socket.send_to(&data, addr).await {
            Ok(bytes_sent) => {
                let mut stats = self.stats.lock();
                stats.packets_sent += 1;
                stats.bytes_sent += bytes_sent as u64;
                stats.last_activity = Some(Instant::now());

                debug!(
                    kind = %message.kind,
                    addr = %target,
                    bytes = bytes_sent,
                    sequence_id = message.sequence_id,
                    "sent datagram"
                );
                true
            }
            Err(err) => {
                self.stats.lock().errors += 1;
                error!(kind = %message.kind, addr = %target, error = %err, "failed to send datagram");
                false
            }
        }
    }

    /// One bounded receive attempt for a message of the expected kind.
    ///
    /// A timeout is a normal "no message" outcome. A datagram that fails
    /// to decode is swallowed with a debug log, on the theory that one bad
    /// packet on a lossy link is not worth a receiver's attention.
    pub async fn receive(&self, expected: MessageKind) -> Option<Message> {
        let mut buffer = self.recv_buffer.lock().await;
        buffer.resize(self.max_packet_size, 0);

        let (len, peer) = match timeout(self.receive_timeout, self.socket.recv_from(&mut buffer)).await
        {
            Ok(Ok(received)) => received,
            Ok(Err(err)) => {
                self.stats.lock().errors += 1;
                error!(expected = %expected, error = %err, "failed to receive datagram");
                return None;
            }
            // Timeout: nothing arrived within the bound.
            Err(_) => return None,
        };

        match decode(&buffer[..len], expected) {
            Ok(mut message) => {
                message.sender = Some(format!("{}:{}", peer.ip(), peer.port()));
                message.timestamp = Some(SystemTime::now());

                let mut stats = self.stats.lock();
                stats.packets_received += 1;
                stats.bytes_received += len as u64;
                stats.last_activity = Some(Instant::now());
                drop(stats);

                debug!(kind = %expected, peer = %peer, bytes = len, "received datagram");
                Some(message)
            }
            Err(err) => {
                self.stats.lock().errors += 1;
                debug!(expected = %expected, error = %err, "ignoring undecodable datagram");
                None
            }
        }
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|source| NetworkError::socket("local_addr", source))
    }

    /// Snapshot of the activity counters.
    pub fn stats(&self) -> TransportStats {
        self.stats.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TIMEOUT: Duration = Duration::from_millis(200);
    const MAX_PACKET: usize = 1024;

    async fn pair() -> (UdpTransport, UdpTransport, std::net::SocketAddr) {
        let rx = UdpTransport::bind("127.0.0.1:0", TEST_TIMEOUT, MAX_PACKET)
            .await
            .unwrap();
        let tx = UdpTransport::bind("127.0.0.1:0", TEST_TIMEOUT, MAX_PACKET)
            .await
            .unwrap();
        let rx_addr = rx.local_addr().unwrap();
        (rx, tx, rx_addr)
    }

    #[tokio::test]
    async fn sends_and_receives_a_sensor_reading() {
        let (rx, tx, rx_addr) = pair().await;

        let mut msg = Message::sensor(42.25);
        assert!(tx.send(&mut msg, rx_addr).await);

        let received = rx.receive(MessageKind::SensorData).await.unwrap();
        assert_eq!(received.as_scalar(), Some(42.25));
        assert!(received.sender.is_some());
        assert!(received.timestamp.is_some());
    }

    #[tokio::test]
    async fn sequence_ids_are_monotonic_per_transport() {
        let (rx, tx, rx_addr) = pair().await;

        for expected_seq in 0..3u64 {
            let mut msg = Message::command("status");
            assert!(tx.send(&mut msg, rx_addr).await);
            assert_eq!(msg.sequence_id, Some(expected_seq));
        }

        // A pre-stamped id is left alone and does not advance the counter.
        let mut msg = Message::command("status");
        msg.sequence_id = Some(99);
        assert!(tx.send(&mut msg, rx_addr).await);
        assert_eq!(msg.sequence_id, Some(99));

        let mut msg = Message::command("status");
        assert!(tx.send(&mut msg, rx_addr).await);
        assert_eq!(msg.sequence_id, Some(3));

        // Drain so nothing lingers on the receiver port.
        while rx.receive(MessageKind::Command).await.is_some() {}
    }

    #[tokio::test]
    async fn receive_times_out_with_none() {
        let (rx, _tx, _) = pair().await;

        let start = Instant::now();
        assert!(rx.receive(MessageKind::Ack).await.is_none());
        let elapsed = start.elapsed();
        assert!(elapsed >= TEST_TIMEOUT);
        assert!(elapsed < TEST_TIMEOUT + Duration::from_millis(100));
    }

    #[tokio::test]
    async fn undecodable_datagram_is_swallowed() {
        let (rx, tx, rx_addr) = pair().await;

        // Raw invalid UTF-8, sent outside the codec.
        let raw = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        raw.send_to(&[0xff, 0xfe, 0x00], rx_addr).await.unwrap();

        assert!(rx.receive(MessageKind::Command).await.is_none());
        assert_eq!(rx.stats().errors, 1);

        // The transport keeps working afterwards.
        let mut msg = Message::command("status");
        assert!(tx.send(&mut msg, rx_addr).await);
        assert!(rx.receive(MessageKind::Command).await.is_some());
    }

    #[tokio::test]
    async fn stats_track_traffic() {
        let (rx, tx, rx_addr) = pair().await;

        let mut msg = Message::command("clear");
        tx.send(&mut msg, rx_addr).await;
        rx.receive(MessageKind::Command).await.unwrap();

        let tx_stats = tx.stats();
        assert_eq!(tx_stats.packets_sent, 1);
        assert_eq!(tx_stats.bytes_sent, 5);

        let rx_stats = rx.stats();
        assert_eq!(rx_stats.packets_received, 1);
        assert_eq!(rx_stats.bytes_received, 5);
        assert!(rx_stats.last_activity.is_some());
    }
}
