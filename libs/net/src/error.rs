//! Network-layer error taxonomy.
//!
//! Kept intentionally small: transport send/receive failures are converted
//! to `false`/`None` plus a log line at the lowest layer and never reach
//! these variants. What remains is the one class of failure a caller must
//! see: a receiver channel that could not be set up.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

#[derive(Debug, Error)]
pub enum NetworkError {
    /// A receiver socket could not be bound to its configured port.
    ///
    /// Aborts that channel's startup only; sibling channels continue.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A socket operation failed outside the send/receive hot path.
    #[error("socket {operation} failed: {source}")]
    Socket {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl NetworkError {
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        NetworkError::Bind {
            addr: addr.into(),
            source,
        }
    }

    pub fn socket(operation: &'static str, source: std::io::Error) -> Self {
        NetworkError::Socket { operation, source }
    }
}
