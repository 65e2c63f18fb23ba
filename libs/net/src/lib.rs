//! # riglink Network Infrastructure
//!
//! Socket-facing half of the control link: one UDP transport wrapper, the
//! per-channel receiver loops on both ends of the link, the shared sensor
//! ring buffer they feed, and the outbound client with the solenoid
//! command/ack exchange.
//!
//! ```text
//! remote device → UDP socket → UdpTransport::receive → receiver loop
//!               → SensorBuffer push (+ callback) → consumer query
//!
//! command      → LinkClient → UdpTransport::send → UDP socket
//!               (+ single bounded ack wait for the solenoid link)
//! ```
//!
//! Reliability is deliberately absent: each send or receive is exactly one
//! datagram attempt, losses are expected, and retry policy belongs to the
//! caller.

pub mod buffer;
pub mod client;
pub mod device;
pub mod error;
pub mod receiver;
pub mod server;
pub mod transport;

pub use buffer::SensorBuffer;
pub use client::LinkClient;
pub use device::{map_drive_range, DeviceServer, TelemetrySender};
pub use error::{NetworkError, Result};
pub use receiver::StartReport;
pub use server::{ChannelCallbacks, LinkServer};
pub use transport::{TransportStats, UdpTransport};
