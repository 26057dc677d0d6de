//! The session: this page's mirror of the whole AirConsole session.
//!
//! [`Session`] owns the device directory and every piece of derived state
//! (own device id, clock offset, safe area, silenced queue). It is a pure
//! state machine: inbound events go in through [`Session::apply`] (see
//! `reconcile.rs`), notifications come out, and outbound commands are
//! queued in an outbox (see `commands.rs`) for the owner to send.
//!
//! This file holds construction and the read-only queries.

use std::cell::OnceCell;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use airconsole_protocol::{keys, DeviceId, DeviceRecord, OutboundCommand, SafeArea};
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::{DeviceDirectory, GameUrlResolver, LocationResolver, SessionConfig, SessionError, SilencedQueue};

/// Base URL of the profile picture service.
const PROFILE_PICTURE_URL: &str = "https://www.airconsole.com/api/profile-picture";

/// Picture size in pixels when the caller doesn't pick one.
const DEFAULT_PICTURE_SIZE: u32 = 64;

/// One page's view of the session.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [not ready] ──ready──→ [ready] ──update/message/...──→ [ready]
///              │                      │
///              ▼                      ▼
///        outbox: handshake     outbox: set / message commands
/// ```
///
/// There is no terminal state; a session lives as long as its page.
pub struct Session {
    pub(crate) config: SessionConfig,

    /// Maps page URLs to game identities.
    pub(crate) resolver: Box<dyn LocationResolver>,

    /// Normalized identity of this page's game.
    pub(crate) game_url: Option<String>,

    /// This page's own device id. `None` until `ready`.
    pub(crate) device_id: Option<DeviceId>,

    pub(crate) directory: DeviceDirectory,

    /// Milliseconds to add to local time. `None` = time sync disabled.
    pub(crate) server_time_offset: Option<f64>,

    pub(crate) game_safe_area: Option<SafeArea>,

    pub(crate) silenced: SilencedQueue,

    /// Commands waiting to be sent, oldest first.
    pub(crate) outbox: Vec<OutboundCommand>,

    /// Parameters read from this page's location fragment on first use.
    navigate_parameters: OnceCell<Option<Value>>,
}

impl Session {
    /// Creates a session that scopes devices with [`GameUrlResolver`].
    pub fn new(config: SessionConfig) -> Self {
        Self::with_resolver(config, Box::new(GameUrlResolver))
    }

    /// Creates a session with a custom [`LocationResolver`].
    ///
    /// The outbox starts with the startup commands: the requested
    /// orientation (if any) followed by the handshake.
    pub fn with_resolver(config: SessionConfig, resolver: Box<dyn LocationResolver>) -> Self {
        let game_url = resolver.normalize(&config.location);

        let mut outbox = Vec::with_capacity(2);
        if let Some(orientation) = config.orientation {
            outbox.push(OutboundCommand::set(
                keys::ORIENTATION,
                Value::from(orientation.as_str()),
            ));
        }
        outbox.push(OutboundCommand::Ready(config.handshake()));

        tracing::debug!(game_url = ?game_url, "session created");

        Self {
            server_time_offset: config.synchronize_time.then_some(0.0),
            config,
            resolver,
            game_url,
            device_id: None,
            directory: DeviceDirectory::new(),
            game_safe_area: None,
            silenced: SilencedQueue::new(),
            outbox,
            navigate_parameters: OnceCell::new(),
        }
    }

    /// Drains the commands queued since the last call.
    pub fn take_outbox(&mut self) -> Vec<OutboundCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// This page's normalized game identity.
    pub fn game_url(&self) -> Option<&str> {
        self.game_url.as_deref()
    }

    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }

    // -----------------------------------------------------------------------
    // Identity & scoping
    // -----------------------------------------------------------------------

    /// This page's own device id, once `ready` has arrived.
    pub fn device_id(&self) -> Option<DeviceId> {
        self.device_id
    }

    pub fn is_ready(&self) -> bool {
        self.device_id.is_some()
    }

    /// Returns `true` if this page is the Screen.
    pub fn is_screen(&self) -> bool {
        self.device_id == Some(DeviceId::SCREEN)
    }

    /// The record in slot `id`, if any.
    pub fn device(&self, id: DeviceId) -> Option<&DeviceRecord> {
        self.directory.get(id)
    }

    /// Normalized game identity of a raw location.
    pub(crate) fn game_identity(&self, location: Option<&str>) -> Option<String> {
        location.and_then(|location| self.resolver.normalize(location))
    }

    /// Normalized location of the device currently in slot `id`.
    pub(crate) fn location_of(&self, id: DeviceId) -> Option<String> {
        self.directory
            .get(id)
            .and_then(|record| self.game_identity(record.location.as_deref()))
    }

    /// Returns `true` if slot `id` holds a device that has loaded this game.
    pub fn is_in_game(&self, id: DeviceId) -> bool {
        self.directory.contains(id) && self.location_of(id) == self.game_url
    }

    /// In-game controllers in id order.
    pub fn controller_device_ids(&self) -> Vec<DeviceId> {
        self.directory
            .iter()
            .map(|(id, _)| id)
            .filter(|id| id.is_controller() && self.is_in_game(*id))
            .collect()
    }

    /// The controller in charge: the first premium in-game controller, or
    /// the first in-game controller if none is premium.
    pub fn master_controller_device_id(&self) -> Option<DeviceId> {
        let controllers = self.controller_device_ids();
        controllers
            .iter()
            .copied()
            .find(|id| self.is_premium(Some(*id)) == Some(true))
            .or_else(|| controllers.first().copied())
    }

    // -----------------------------------------------------------------------
    // Per-device state
    // -----------------------------------------------------------------------
    //
    // The `Option<DeviceId>` queries default to this page's own device.

    fn resolve(&self, id: Option<DeviceId>) -> Option<DeviceId> {
        id.or(self.device_id)
    }

    fn record_of(&self, id: Option<DeviceId>) -> Option<&DeviceRecord> {
        self.resolve(id).and_then(|id| self.directory.get(id))
    }

    /// Custom state of a device, but only while it is in this game.
    pub fn custom_device_state(&self, id: Option<DeviceId>) -> Option<&Value> {
        let id = self.resolve(id)?;
        if !self.is_in_game(id) {
            return None;
        }
        self.directory.get(id).and_then(DeviceRecord::custom_state)
    }

    pub fn uid(&self, id: Option<DeviceId>) -> Option<&str> {
        self.record_of(id).and_then(|record| record.uid.as_deref())
    }

    /// Nickname of a device; `"Guest <id>"` if it hasn't set one.
    pub fn nickname(&self, id: Option<DeviceId>) -> Option<String> {
        let id = self.resolve(id)?;
        let record = self.directory.get(id)?;
        Some(match record.nickname.as_deref() {
            Some(nickname) if !nickname.is_empty() => nickname.to_string(),
            _ => format!("Guest {}", id.0),
        })
    }

    /// Profile picture URL for a device. `size` defaults to 64 pixels.
    pub fn profile_picture(&self, id: Option<DeviceId>, size: Option<u32>) -> Option<String> {
        let record = self.record_of(id)?;
        let mut url = Self::profile_picture_for_uid(record.uid.as_deref().unwrap_or_default(), size);

        match &record.picture {
            Some(Value::String(version)) if !version.is_empty() => {
                url.push_str("&v=");
                url.push_str(version);
            }
            Some(version @ Value::Number(_)) => {
                url.push_str("&v=");
                url.push_str(&version.to_string());
            }
            _ => {}
        }
        Some(url)
    }

    /// Profile picture URL for a user, without a version suffix.
    pub fn profile_picture_for_uid(uid: &str, size: Option<u32>) -> String {
        let size = size.unwrap_or(DEFAULT_PICTURE_SIZE);
        format!("{PROFILE_PICTURE_URL}?uid={uid}&size={size}")
    }

    pub fn is_user_logged_in(&self, id: Option<DeviceId>) -> Option<bool> {
        self.record_of(id).and_then(|record| record.auth)
    }

    pub fn language(&self, id: Option<DeviceId>) -> Option<&str> {
        self.record_of(id).and_then(|record| record.language.as_deref())
    }

    /// Whether a controller is premium. `None` for the Screen and for
    /// empty slots.
    pub fn is_premium(&self, id: Option<DeviceId>) -> Option<bool> {
        let id = self.resolve(id)?;
        if id.is_screen() {
            return None;
        }
        self.directory.get(id).map(|record| record.premium)
    }

    /// Every premium controller in the directory, in id order.
    pub fn premium_device_ids(&self) -> Vec<DeviceId> {
        self.directory
            .iter()
            .filter(|(id, record)| id.is_controller() && record.premium)
            .map(|(id, _)| id)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Active players & silencing
    // -----------------------------------------------------------------------

    /// The active-player order set by the Screen.
    pub fn active_player_device_ids(&self) -> &[DeviceId] {
        self.directory.active_players()
    }

    pub fn convert_player_number_to_device_id(&self, player_number: usize) -> Option<DeviceId> {
        self.directory.player_device(player_number)
    }

    pub fn convert_device_id_to_player_number(&self, id: DeviceId) -> Option<usize> {
        self.directory.player_number(id)
    }

    /// This page's own player number.
    pub(crate) fn own_player_number(&self) -> Option<usize> {
        self.device_id
            .and_then(|id| self.directory.player_number(id))
    }

    /// Returns `true` while a round is running and late joiners are being
    /// held back.
    pub fn players_silenced(&self) -> bool {
        let Some(screen) = self.directory.screen() else {
            return false;
        };
        let enabled =
            self.config.silence_inactive_players || screen.silence_players == Some(true);
        enabled && !self.directory.active_players().is_empty()
    }

    /// Returns `true` if traffic to or from `id` is currently held back.
    /// `None` (a broadcast) and the Screen are never silenced.
    pub fn is_silenced(&self, id: Option<DeviceId>) -> bool {
        match id {
            Some(id) => {
                self.players_silenced()
                    && id.is_controller()
                    && self.directory.player_number(id).is_none()
            }
            None => false,
        }
    }

    /// Updates parked for silenced devices, waiting for the round to end.
    pub fn silenced_updates(&self) -> &SilencedQueue {
        &self.silenced
    }

    // -----------------------------------------------------------------------
    // Time & layout
    // -----------------------------------------------------------------------

    /// Server time in milliseconds since the Unix epoch.
    ///
    /// # Errors
    /// [`SessionError::TimeSyncDisabled`] unless the session was created
    /// with `synchronize_time`.
    pub fn server_time(&self) -> Result<f64, SessionError> {
        let local = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
            .unwrap_or_default();
        self.server_time_at(local)
    }

    /// Server time corresponding to the local timestamp `local_millis`.
    pub fn server_time_at(&self, local_millis: f64) -> Result<f64, SessionError> {
        self.server_time_offset
            .map(|offset| local_millis + offset)
            .ok_or(SessionError::TimeSyncDisabled)
    }

    /// The Screen area the game may draw into, if the host sent one.
    pub fn game_safe_area(&self) -> Option<SafeArea> {
        self.game_safe_area
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Parameters the previous game passed to
    /// [`navigate_to`](Self::navigate_to) when it loaded this page.
    ///
    /// They travel as URL-encoded JSON in the location's fragment. `None`
    /// if there is no fragment or it doesn't hold JSON.
    pub fn navigate_parameters(&self) -> Option<&Value> {
        self.navigate_parameters
            .get_or_init(|| parse_navigate_parameters(&self.config.location))
            .as_ref()
    }
}

fn parse_navigate_parameters(location: &str) -> Option<Value> {
    let (_, fragment) = location.split_once('#')?;
    if fragment.is_empty() {
        return None;
    }
    let decoded = match percent_decode_str(fragment).decode_utf8() {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(error = %e, "navigate parameters are not utf-8");
            return None;
        }
    };
    match serde_json::from_str(&decoded) {
        Ok(parameters) => Some(parameters),
        Err(e) => {
            tracing::debug!(error = %e, "navigate parameters are not json");
            None
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("game_url", &self.game_url)
            .field("device_id", &self.device_id)
            .field("directory", &self.directory)
            .field("server_time_offset", &self.server_time_offset)
            .field("silenced", &self.silenced)
            .field("outbox", &self.outbox.len())
            .finish_non_exhaustive()
    }
}
