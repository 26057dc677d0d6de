//! Error types for the session layer.

use airconsole_protocol::ProtocolError;

/// Programmer-misuse faults raised by session operations.
///
/// None of these are recoverable by the SDK: they mean the calling code
/// used an API it isn't allowed to, and the error goes straight back to
/// it.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A Screen-only operation was called from a Controller (or before
    /// this page knows its own device id).
    #[error("only the screen can call {operation}")]
    ScreenOnly { operation: &'static str },

    /// `server_time` was called but the session was configured without
    /// `synchronize_time`.
    #[error("server time requires a session created with synchronize_time enabled")]
    TimeSyncDisabled,

    /// A property was set on a custom state that isn't a JSON object.
    #[error("custom device state needs to be an object")]
    CustomStateNotObject,

    /// A high score that isn't a finite number.
    #[error("score needs to be a finite number, got {0}")]
    InvalidScore(f64),

    /// The Screen must name the uids it acts on.
    #[error("{operation} from the screen requires at least one uid")]
    UidRequired { operation: &'static str },

    /// A relative navigation target could not be resolved against this
    /// page's location.
    #[error("cannot resolve {target} against the page location: {source}")]
    InvalidNavigationTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// A payload could not be turned into JSON.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
