//! Commands the page posts to the host frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DeviceId;

/// Keys understood by the host's generic `set` command.
///
/// Every higher-level setter in the SDK is sugar over
/// `{ "action": "set", "key": <one of these>, "value": ... }`.
pub mod keys {
    pub const CUSTOM: &str = "custom";
    pub const PLAYERS: &str = "players";
    pub const ORIENTATION: &str = "orientation";
    pub const IMMERSIVE: &str = "immersive";
    pub const VIBRATE: &str = "vibrate";
    pub const AD: &str = "ad";
    pub const PREMIUM: &str = "premium";
    /// Navigation: `true` for the store, a URL for a game.
    pub const HOME: &str = "home";
    pub const PASS_EXTERNAL_URL: &str = "pass_external_url";
    pub const EMAIL: &str = "email";
    pub const LOGIN: &str = "login";
    pub const PERSISTENT_REQUEST: &str = "persistentrequest";
    pub const PERSISTENT_STORE: &str = "persistentstore";
    pub const HIGHSCORE: &str = "highscore";
    pub const HIGHSCORES: &str = "highscores";
}

/// The first thing a page posts: who it is and what it wants.
///
/// Optional fields are omitted from the JSON entirely rather than sent
/// as `null`, matching what the host expects from older SDKs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handshake {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronize_time: Option<bool>,

    /// Device motion sampling interval in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_motion: Option<u32>,

    /// This page's URL.
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<bool>,

    #[serde(rename = "silencePlayers", default)]
    pub silence_players: bool,

    #[serde(rename = "supportsNativeGameSizing", default)]
    pub supports_native_game_sizing: bool,
}

/// Everything the page can post to the host.
///
/// Internally tagged on `action`, like inbound events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundCommand {
    /// Initial handshake.
    Ready(Handshake),

    /// Generic state write. See [`keys`].
    Set {
        key: String,
        #[serde(default)]
        value: Value,
    },

    /// Device-to-device message. No `to` means broadcast to everyone
    /// except the sender.
    Message {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<DeviceId>,
        #[serde(default)]
        data: Value,
    },
}

impl OutboundCommand {
    /// Shorthand for a `set` command.
    pub fn set(key: &str, value: Value) -> Self {
        Self::Set {
            key: key.to_string(),
            value,
        }
    }

    /// Returns the `set` key, if this is a `set` command.
    pub fn set_key(&self) -> Option<&str> {
        match self {
            Self::Set { key, .. } => Some(key),
            _ => None,
        }
    }
}
