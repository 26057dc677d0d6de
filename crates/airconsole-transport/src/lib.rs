//! Transport abstraction layer for the AirConsole client SDK.
//!
//! A page running inside the platform's iframe talks to exactly one peer:
//! the host frame. The [`Transport`] trait is the outbound half of that
//! link. Inbound events are pushed *into* the client by whoever owns the
//! receiving side (a `message` listener in a browser, an mpsc receiver in
//! tests and native harnesses).
//!
//! # Feature Flags
//!
//! - `channel` (default): [`ChannelTransport`], an in-memory transport
//!   backed by a tokio unbounded mpsc channel

mod error;
#[cfg(feature = "channel")]
mod channel;

pub use error::TransportError;
#[cfg(feature = "channel")]
pub use channel::ChannelTransport;

/// Posts encoded commands to the host frame.
///
/// Posting is synchronous and fire-and-forget: there is no acknowledgement
/// channel. A successful return only means the bytes were handed off.
pub trait Transport: 'static {
    /// The error type for post operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Hands `data` to the host frame.
    fn post(&self, data: &[u8]) -> Result<(), Self::Error>;
}

/// A [`Transport`] for pages that are not embedded in a host frame.
///
/// Every post fails with [`TransportError::NoHost`]. Useful for running
/// client code outside the platform, where outbound traffic has nowhere
/// to go.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedTransport;

impl Transport for DetachedTransport {
    type Error = TransportError;

    fn post(&self, _data: &[u8]) -> Result<(), Self::Error> {
        Err(TransportError::NoHost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_post_returns_no_host() {
        let result = DetachedTransport.post(b"{}");
        assert!(matches!(result, Err(TransportError::NoHost)));
    }

    #[test]
    fn test_error_display_messages() {
        assert_eq!(TransportError::NoHost.to_string(), "no host frame attached");
        assert_eq!(
            TransportError::ConnectionClosed("gone".into()).to_string(),
            "connection closed: gone"
        );
    }
}
