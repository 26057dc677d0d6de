/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// There is no host frame to talk to (the page is not embedded).
    #[error("no host frame attached")]
    NoHost,

    /// The host side of the connection has gone away.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
