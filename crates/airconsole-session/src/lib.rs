//! Session state and event reconciliation for AirConsole pages.
//!
//! This crate turns the host frame's stream of events into a consistent
//! local mirror of every device in the session:
//!
//! 1. **Location scoping**: deciding which devices have loaded *this*
//!    game ([`LocationResolver`], [`GameUrlResolver`])
//! 2. **Directory**: the per-device records and the active-player
//!    order ([`DeviceDirectory`])
//! 3. **Reconciliation**: applying events in delivery order and
//!    producing [`Notification`]s ([`Session::apply`])
//! 4. **Silencing**: deferring late joiners' updates until the current
//!    round ends ([`SilencedQueue`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Façade (above)  ← owns a Session, a Transport and an EventHandler
//!     ↕
//! Session Layer (this crate)  ← pure state machine, no I/O
//!     ↕
//! Protocol Layer (below)  ← InboundEvent, OutboundCommand, DeviceRecord
//! ```
//!
//! The session never touches a transport. Commands it wants sent are
//! queued in an outbox and drained by the owner with
//! [`Session::take_outbox`].

mod commands;
mod config;
mod directory;
mod error;
mod handler;
mod location;
mod notification;
mod reconcile;
mod session;
mod silence;

pub use config::SessionConfig;
pub use directory::DeviceDirectory;
pub use error::SessionError;
pub use handler::{dispatch, EventHandler};
pub use location::{GameUrlResolver, LocationChange, LocationResolver};
pub use notification::Notification;
pub use session::Session;
pub use silence::SilencedQueue;
