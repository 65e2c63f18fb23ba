//! # riglink Type Definitions
//!
//! Shared data structures for the riglink instrumentation control link.
//! This crate is the "pure data" layer of the system:
//!
//! - [`Message`]: the unit of exchange on every UDP channel, with a
//!   [`MessageKind`] tag and a [`Payload`] sum type matched exhaustively
//!   at encode/decode sites.
//! - [`SensorStream`] / [`ChannelKind`]: fixed enumerations of the data
//!   streams and receiver channels, replacing loose string tags.
//! - [`DataPacket`]: a transfer/display shape for a single sensor reading.
//!
//! ## What This Crate Does NOT Contain
//! - Wire encoding rules (belongs in `riglink-codec`)
//! - Socket management or receiver loops (belongs in `riglink-net`)

pub mod channel;
pub mod message;
pub mod packet;

pub use channel::{ChannelKind, SensorStream};
pub use message::{Message, MessageKind, Payload};
pub use packet::DataPacket;
