//! Shared machinery for channel receiver loops.
//!
//! Every receiver on the link, PC side or device side, runs the same
//! lifecycle: bind the socket, loop on one bounded receive per iteration,
//! hand each decoded message to a channel-specific handler, and exit only
//! when the shared shutdown flag flips. Timeouts and undecodable packets
//! are absorbed by the transport; a handler that finds the payload
//! malformed logs and returns, and the loop keeps polling.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use riglink_types::{ChannelKind, Message, MessageKind};

use crate::error::NetworkError;
use crate::transport::UdpTransport;

/// How long `stop` waits for each receiver task before abandoning it.
///
/// A task still running past this bound is leaked, which is acceptable at
/// process exit and logged rather than silently ignored.
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Outcome of starting a set of receiver channels.
///
/// A channel whose port cannot be bound fails alone; its siblings run
/// regardless. Callers decide whether a partial start is acceptable.
#[derive(Debug, Default)]
pub struct StartReport {
    pub started: Vec<ChannelKind>,
    pub failed: Vec<(ChannelKind, NetworkError)>,
}

impl StartReport {
    /// True only when at least one channel started and none failed. An
    /// empty report, such as a `start` call on an already-running server,
    /// does not count as success.
    pub fn all_started(&self) -> bool {
        !self.started.is_empty() && self.failed.is_empty()
    }
}

/// Run one channel's receive loop until shutdown.
pub(crate) async fn run_receiver<F>(
    kind: ChannelKind,
    expected: MessageKind,
    transport: UdpTransport,
    mut shutdown: watch::Receiver<bool>,
    on_message: F,
) where
    F: Fn(&Message) + Send + 'static,
{
    match transport.local_addr() {
        Ok(addr) => info!(channel = %kind, %addr, "receiver listening"),
        Err(_) => info!(channel = %kind, "receiver listening"),
    }

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            // Closed sender counts as shutdown too.
            _ = shutdown.changed() => break,
            received = transport.receive(expected) => {
                if let Some(message) = received {
                    on_message(&message);
                }
            }
        }
    }

    info!(channel = %kind, "receiver stopped");
}

/// Await a receiver task with the shutdown grace period, abandoning the
/// handle if it does not finish in time.
pub(crate) async fn join_with_grace(kind: ChannelKind, handle: JoinHandle<()>) {
    match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
        Ok(Ok(())) => debug!(channel = %kind, "receiver task joined"),
        Ok(Err(err)) => warn!(channel = %kind, error = %err, "receiver task panicked"),
        Err(_) => warn!(
            channel = %kind,
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "receiver task did not stop in time, abandoning handle"
        ),
    }
}
