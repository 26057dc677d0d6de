//! In-memory transport backed by a tokio unbounded mpsc channel.
//!
//! The unbounded sender's `send` is synchronous, which is exactly the
//! shape [`Transport::post`] needs. The receiving half is handed to
//! whatever plays the host: a test asserting on outbound commands, or a
//! native harness forwarding them somewhere else.

use tokio::sync::mpsc;

use crate::{Transport, TransportError};

/// A [`Transport`] that pushes every posted payload onto an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver that observes its output.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Wraps an existing sender.
    pub fn new(sender: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self { sender }
    }

    /// Returns `true` once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Transport for ChannelTransport {
    type Error = TransportError;

    fn post(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.sender.send(data.to_vec()).map_err(|_| {
            TransportError::ConnectionClosed("host receiver dropped".into())
        })?;
        tracing::trace!(bytes = data.len(), "posted to host");
        Ok(())
    }
}
