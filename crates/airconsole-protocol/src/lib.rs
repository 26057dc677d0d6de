//! Wire protocol between an AirConsole page and its host frame.
//!
//! This crate defines the "language" spoken across the iframe boundary:
//!
//! - **Types** ([`DeviceId`], [`DeviceRecord`], [`SafeArea`], …): the
//!   data that appears inside events.
//! - **Inbound** ([`InboundEvent`]): everything the host can tell us,
//!   decoded once into a tagged union. Update flags such as
//!   `_is_custom_update` become a typed [`ChangeSet`] at this boundary so
//!   nothing above it branches on stringly-typed fields.
//! - **Outbound** ([`OutboundCommand`]): the handshake, the generic
//!   `set` primitive, and device-to-device messages.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, bytes out.
//!
//! ```text
//! Transport (bytes) → Protocol (InboundEvent) → Session (directory)
//! ```

mod codec;
mod error;
mod inbound;
mod outbound;
mod types;

pub use codec::Codec;
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use inbound::{ChangeSet, DeviceUpdate, InboundEvent, ProfileUpdate, ReadySnapshot};
pub use outbound::{keys, Handshake, OutboundCommand};
pub use types::{
    CompositionKind, CompositionVibration, DeviceId, DeviceRecord, Orientation, SafeArea,
    Vibration, VibrationPrimitive,
};

/// SDK version announced in the handshake.
pub const PROTOCOL_VERSION: &str = "1.10.0";
