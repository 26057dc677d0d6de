//! Unified error type for the AirConsole SDK.

use airconsole_protocol::ProtocolError;
use airconsole_session::SessionError;

/// Every error an `AirConsole` call can return.
///
/// Wraps the per-layer enums so application code matches on one type;
/// `?` lifts a layer error into it. Transport failures never surface
/// here: posting is fire-and-forget and a failed post is only logged.
#[derive(Debug, thiserror::Error)]
pub enum AirConsoleError {
    /// A payload that could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A misused session operation (Screen-only call, bad score, ...).
    #[error(transparent)]
    Session(#[from] SessionError),
}
