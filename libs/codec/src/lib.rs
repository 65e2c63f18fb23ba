//! # riglink Protocol Codec
//!
//! The "rules" layer of the control link: how typed messages become bytes
//! on the wire and back, and which command strings the system recognises.
//!
//! ## Framing conventions
//!
//! One UDP datagram carries one message, framed by payload variant:
//!
//! | Payload              | Wire form                                   |
//! |----------------------|---------------------------------------------|
//! | `Payload::Text`      | raw UTF-8 bytes                             |
//! | `Payload::Scalar`    | 4-byte big-endian IEEE-754 float            |
//! | `Payload::Sequence`  | space-separated decimal text, UTF-8 encoded |
//!
//! Decoding is driven by the *expected* kind, not by sniffing: a
//! `SensorData` datagram of exactly four bytes is a binary float, anything
//! else is text. Encode and decode rules are fixed per channel and are not
//! assumed to round-trip structured payloads; the waveform list is
//! encoded here but parsed by the receiving channel's own split rule.
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or receive loops (belongs in `riglink-net`)
//! - Value-range validation of readings (downstream concern)

pub mod command;
pub mod error;
pub mod wire;

pub use command::{CommandCategory, CommandSet};
pub use error::ProtocolError;
pub use wire::{decode, encode};
