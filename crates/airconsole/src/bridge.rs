//! The async host bridge: feeds inbound host messages to a client.
//!
//! Whatever receives the host's `postMessage` traffic (a browser event
//! listener, a native harness, a test) pushes the raw bytes onto an mpsc
//! channel. [`run_bridge`] drains that channel in FIFO order, one event
//! at a time, so the session sees events exactly in delivery order.

use airconsole_protocol::Codec;
use airconsole_session::EventHandler;
use airconsole_transport::Transport;
use tokio::sync::mpsc;

use crate::AirConsole;

/// Applies every inbound message until the sending side closes.
///
/// Returns the number of messages handled. Reconciliation never yields
/// mid-event; the only await point is waiting for the next message.
pub async fn run_bridge<T, H, C>(
    client: &mut AirConsole<T, H, C>,
    mut inbound: mpsc::UnboundedReceiver<Vec<u8>>,
) -> usize
where
    T: Transport,
    H: EventHandler,
    C: Codec,
{
    let mut handled = 0;
    while let Some(data) = inbound.recv().await {
        client.handle_message(&data);
        handled += 1;
    }
    tracing::info!(handled, "host bridge closed");
    handled
}
