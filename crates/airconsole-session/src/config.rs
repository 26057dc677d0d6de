//! Construction-time configuration for a session.

use airconsole_protocol::{Handshake, Orientation, PROTOCOL_VERSION};
use serde::{Deserialize, Serialize};

/// Options recognised when a page creates its session.
///
/// Each field toggles one independent behavior. `Default` gives the
/// same defaults a page gets when it passes no options at all, so a
/// config is usually built with struct-update syntax:
///
/// ```rust
/// use airconsole_session::SessionConfig;
///
/// let config = SessionConfig {
///     synchronize_time: true,
///     ..SessionConfig::new("https://game.example/screen.html")
/// };
/// assert!(config.silence_inactive_players);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// URL of the page this session runs in. Its normalized form is the
    /// game identity every "connected to this game" check compares
    /// against.
    pub location: String,

    /// Orientation requested from the host on startup.
    pub orientation: Option<Orientation>,

    /// Track the host's clock offset so `server_time` works.
    pub synchronize_time: bool,

    /// Whether the embedding page layer should apply its document setup.
    /// The session itself never reads this.
    pub setup_document: bool,

    /// Device motion sampling interval in milliseconds (controllers only).
    pub device_motion: Option<u32>,

    /// Ask the host to load the game's translation file.
    pub translation: bool,

    /// Defer traffic from controllers that join during a running round.
    pub silence_inactive_players: bool,

    /// The game can size itself natively on the screen.
    pub supports_native_game_sizing: bool,
}

impl SessionConfig {
    /// Default options for a page at `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Builds the handshake announced to the host.
    pub fn handshake(&self) -> Handshake {
        Handshake {
            version: PROTOCOL_VERSION.to_string(),
            synchronize_time: self.synchronize_time.then_some(true),
            device_motion: self.device_motion,
            location: self.location.clone(),
            translation: self.translation.then_some(true),
            silence_players: self.silence_inactive_players,
            supports_native_game_sizing: self.supports_native_game_sizing,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            location: String::new(),
            orientation: None,
            synchronize_time: false,
            setup_document: true,
            device_motion: None,
            translation: false,
            silence_inactive_players: true,
            supports_native_game_sizing: false,
        }
    }
}
