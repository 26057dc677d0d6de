//! # AirConsole
//!
//! Client SDK for pages running inside the AirConsole platform, as either
//! the Screen or a Controller.
//!
//! The host frame streams events (devices joining, state changes,
//! messages) to the page. [`AirConsole`] decodes them, reconciles them
//! into a local mirror of the session, calls back into your
//! [`EventHandler`], and posts your commands back to the host.
//!
//! ## Quick Start
//!
//! ```rust
//! use airconsole::prelude::*;
//!
//! #[derive(Default)]
//! struct Game;
//!
//! impl EventHandler for Game {
//!     fn on_message(&mut self, session: &mut Session, from: DeviceId, data: &Value) {
//!         println!("{:?} says {data}", session.nickname(Some(from)));
//!     }
//! }
//!
//! let (transport, _outbound) = ChannelTransport::pair();
//! let config = SessionConfig::new("https://games.example/pong/screen.html");
//! let mut client = AirConsole::new(transport, Game, config);
//!
//! client.handle_message(br#"{"action":"ready","device_id":0,"devices":[{}]}"#);
//! assert!(client.session().is_ready());
//! ```

mod bridge;
mod client;
mod error;
mod telemetry;

pub use bridge::run_bridge;
pub use client::AirConsole;
pub use error::AirConsoleError;
pub use telemetry::init_tracing;

pub use airconsole_protocol as protocol;
pub use airconsole_session as session;
pub use airconsole_transport as transport;

/// Everything a typical page needs.
pub mod prelude {
    pub use crate::{init_tracing, run_bridge, AirConsole, AirConsoleError};
    pub use airconsole_protocol::{
        CompositionVibration, DeviceId, DeviceRecord, JsonCodec, Orientation, SafeArea, Vibration,
        VibrationPrimitive,
    };
    pub use airconsole_session::{EventHandler, Notification, Session, SessionConfig};
    pub use airconsole_transport::{ChannelTransport, DetachedTransport, Transport};
    pub use serde_json::Value;
}
