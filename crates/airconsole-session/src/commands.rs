//! Outbound operations.
//!
//! Every operation here ends in a command pushed onto the session's
//! outbox: either a `message` or a `set` with one of the fixed
//! [`keys`]. Nothing is sent directly; the owner drains the outbox.
//!
//! Misuse (a Screen-only call from a Controller, a bad score, ...) is
//! reported as a [`SessionError`]. Calls that have nothing to do (not
//! ready yet, silenced target, empty immersive state) succeed quietly.

use airconsole_protocol::{
    keys, DeviceId, Orientation, OutboundCommand, ProtocolError, Vibration,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Map, Value};
use url::Url;

use crate::{Notification, Session, SessionError};

/// Bytes `encodeURIComponent` escapes: everything but alphanumerics
/// and `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Default high-score ranks.
const DEFAULT_RANKS: [&str; 1] = ["world"];
/// Default number of high scores returned.
const DEFAULT_TOTAL: u32 = 8;
/// Default number of top scores among them.
const DEFAULT_TOP: u32 = 5;

impl Session {
    fn set(&mut self, key: &str, value: Value) {
        self.outbox.push(OutboundCommand::set(key, value));
    }

    fn require_screen(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.is_screen() {
            Ok(())
        } else {
            Err(SessionError::ScreenOnly { operation })
        }
    }

    // -----------------------------------------------------------------------
    // Messaging
    // -----------------------------------------------------------------------

    /// Sends `data` to `to`, or to every other device for `None`.
    ///
    /// Nothing is sent before `ready` or when the target is silenced.
    pub fn message(&mut self, to: Option<DeviceId>, data: Value) {
        if !self.is_ready() {
            tracing::debug!(to = ?to, "message before ready dropped");
            return;
        }
        if self.is_silenced(to) {
            tracing::debug!(to = ?to, "message to silenced device dropped");
            return;
        }
        self.outbox.push(OutboundCommand::Message { to, data });
    }

    pub fn broadcast(&mut self, data: Value) {
        self.message(None, data);
    }

    // -----------------------------------------------------------------------
    // Device state
    // -----------------------------------------------------------------------

    /// Replaces this device's custom state, locally and on the host.
    pub fn set_custom_device_state(&mut self, data: Value) {
        let Some(own_id) = self.device_id else {
            tracing::debug!("custom state before ready dropped");
            return;
        };
        self.directory.set_custom(own_id, data.clone());
        self.set(keys::CUSTOM, data);
    }

    /// Sets one property of this device's custom state.
    ///
    /// # Errors
    /// [`SessionError::CustomStateNotObject`] if the current state is
    /// something other than a JSON object.
    pub fn set_custom_device_state_property(
        &mut self,
        key: &str,
        value: Value,
    ) -> Result<(), SessionError> {
        if !self.is_ready() {
            return Ok(());
        }
        let mut state = match self.custom_device_state(None) {
            None => Map::new(),
            Some(Value::Object(state)) => state.clone(),
            Some(_) => return Err(SessionError::CustomStateNotObject),
        };
        state.insert(key.to_string(), value);
        self.set_custom_device_state(Value::Object(state));
        Ok(())
    }

    /// Sends the immersive (in-car lighting, experiments) state.
    ///
    /// Only sent if `state` is an object with a `light` or `experiment`
    /// entry; anything else is a no-op.
    ///
    /// # Errors
    /// [`SessionError::ScreenOnly`] when called from a Controller.
    pub fn set_immersive_state(&mut self, state: Value) -> Result<(), SessionError> {
        self.require_screen("set_immersive_state")?;

        let recognised = state
            .as_object()
            .is_some_and(|state| state.contains_key("light") || state.contains_key("experiment"));
        if !recognised {
            tracing::debug!("immersive state without light or experiment ignored");
            return Ok(());
        }
        self.set(keys::IMMERSIVE, state);
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.set(keys::ORIENTATION, Value::from(orientation.as_str()));
    }

    /// Vibrates this controller.
    pub fn vibrate(&mut self, vibration: Vibration) -> Result<(), SessionError> {
        let value = serde_json::to_value(vibration).map_err(ProtocolError::Encode)?;
        self.set(keys::VIBRATE, value);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Active players
    // -----------------------------------------------------------------------

    /// Freezes the current in-game controllers (at most `max_players` of
    /// them, in id order) as the active players, and tells the host.
    ///
    /// `Some(0)` ends the round: every update parked for a silenced
    /// device is replayed through the normal update path. The returned
    /// notifications are the ones that replay produced.
    ///
    /// # Errors
    /// [`SessionError::ScreenOnly`] when called from a Controller.
    pub fn set_active_players(
        &mut self,
        max_players: Option<usize>,
    ) -> Result<Vec<Notification>, SessionError> {
        self.require_screen("set_active_players")?;

        let mut players = self.controller_device_ids();
        if let Some(max_players) = max_players {
            players.truncate(max_players);
        }
        let wire: Vec<u32> = players.iter().map(|id| id.0).collect();

        self.directory.set_active_players(players);
        self.set(keys::PLAYERS, Value::from(wire));

        let mut out = Vec::new();
        if max_players == Some(0) {
            let replay = self.silenced.drain();
            tracing::info!(replayed = replay.len(), "round reset");
            for (device_id, update) in replay {
                self.handle_update(device_id, update, &mut out);
            }
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Platform requests
    // -----------------------------------------------------------------------

    /// Requests an ad break.
    ///
    /// # Errors
    /// [`SessionError::ScreenOnly`] when called from a Controller.
    pub fn show_ad(&mut self) -> Result<(), SessionError> {
        self.require_screen("show_ad")?;
        self.set(keys::AD, Value::Bool(true));
        Ok(())
    }

    /// Offers the user an upgrade to premium.
    pub fn get_premium(&mut self) {
        self.set(keys::PREMIUM, Value::Bool(true));
    }

    /// Sends everyone back to the AirConsole store.
    pub fn navigate_home(&mut self) {
        self.set(keys::HOME, Value::Bool(true));
    }

    /// Sends everyone to another game.
    ///
    /// A `url` starting with `.` is resolved against this page's
    /// location. `parameters` are appended as a URL-encoded JSON
    /// fragment for the target game to read.
    pub fn navigate_to(&mut self, url: &str, parameters: Option<&Value>) -> Result<(), SessionError> {
        let mut target = if url.starts_with('.') {
            resolve_relative(&self.config.location, url).map_err(|source| {
                SessionError::InvalidNavigationTarget { target: url.to_string(), source }
            })?
        } else {
            url.to_string()
        };
        if let Some(parameters) = parameters.filter(|p| is_truthy(p)) {
            let json = serde_json::to_string(parameters).map_err(ProtocolError::Encode)?;
            target.push('#');
            target.extend(utf8_percent_encode(&json, URI_COMPONENT));
        }
        self.set(keys::HOME, Value::String(target));
        Ok(())
    }

    /// Asks the host to open `url` outside the game.
    ///
    /// Returns `false` if this device's client can't do that itself; the
    /// caller then has to open the URL on its own.
    pub fn open_external_url(&mut self, url: &str) -> bool {
        let supported = self
            .device_id
            .and_then(|id| self.directory.get(id))
            .is_some_and(|record| record.passes_external_urls());
        if supported {
            self.set(keys::PASS_EXTERNAL_URL, Value::from(url));
        }
        supported
    }

    pub fn edit_profile(&mut self) {
        self.set(keys::LOGIN, Value::Bool(true));
    }

    pub fn request_email_address(&mut self) {
        self.set(keys::EMAIL, Value::Bool(true));
    }

    // -----------------------------------------------------------------------
    // Persistent data
    // -----------------------------------------------------------------------

    /// Requests stored data for `uids`.
    ///
    /// Controllers always include their own uid. The Screen has to name
    /// at least one.
    pub fn request_persistent_data(&mut self, mut uids: Vec<String>) -> Result<(), SessionError> {
        if self.is_screen() {
            if uids.is_empty() {
                return Err(SessionError::UidRequired {
                    operation: "request_persistent_data",
                });
            }
        } else if let Some(uid) = self.uid(None) {
            uids.push(uid.to_string());
        }
        self.set(keys::PERSISTENT_REQUEST, json!({ "uids": uids }));
        Ok(())
    }

    /// Stores `value` under `key` for a user.
    ///
    /// On a Controller the user is always this device's user and `uid` is
    /// ignored. The Screen has to pass one.
    pub fn store_persistent_data(
        &mut self,
        key: &str,
        value: Value,
        uid: Option<&str>,
    ) -> Result<(), SessionError> {
        let uid = if self.is_screen() {
            match uid {
                Some(uid) if !uid.is_empty() => Some(uid.to_string()),
                _ => {
                    return Err(SessionError::UidRequired {
                        operation: "store_persistent_data",
                    });
                }
            }
        } else {
            self.uid(None).map(str::to_string)
        };
        self.set(
            keys::PERSISTENT_STORE,
            json!({ "key": key, "value": value, "uid": uid }),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // High scores
    // -----------------------------------------------------------------------

    /// Stores a high score for one user, or for a team of users.
    ///
    /// An empty `uids` means this device's user; several uids are joined
    /// with `|`.
    ///
    /// # Errors
    /// [`SessionError::InvalidScore`] if `score` is NaN or infinite.
    pub fn store_high_score(
        &mut self,
        level_name: &str,
        level_version: &str,
        score: f64,
        uids: &[String],
        data: Option<Value>,
        score_string: Option<&str>,
    ) -> Result<(), SessionError> {
        if !score.is_finite() {
            return Err(SessionError::InvalidScore(score));
        }
        let uid = if uids.is_empty() {
            self.uid(None).unwrap_or_default().to_string()
        } else {
            uids.join("|")
        };
        self.set(
            keys::HIGHSCORE,
            json!({
                "uid": uid,
                "level_name": level_name,
                "level_version": level_version,
                "score": score,
                "data": data,
                "score_string": score_string,
            }),
        );
        Ok(())
    }

    /// Requests high scores for a level.
    ///
    /// Defaults: the uids of every in-game controller, ranks `["world"]`,
    /// 8 scores in total of which 5 are the top.
    pub fn request_high_scores(
        &mut self,
        level_name: &str,
        level_version: &str,
        uids: Option<Vec<String>>,
        ranks: Option<Vec<String>>,
        total: Option<u32>,
        top: Option<u32>,
    ) {
        let uids = uids.unwrap_or_else(|| {
            self.controller_device_ids()
                .into_iter()
                .filter_map(|id| self.uid(Some(id)).map(str::to_string))
                .collect()
        });
        let ranks =
            ranks.unwrap_or_else(|| DEFAULT_RANKS.iter().map(|rank| rank.to_string()).collect());
        self.set(
            keys::HIGHSCORES,
            json!({
                "level_name": level_name,
                "level_version": level_version,
                "uids": uids,
                "ranks": ranks,
                "total": total.unwrap_or(DEFAULT_TOTAL),
                "top": top.unwrap_or(DEFAULT_TOP),
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// URL helpers
// ---------------------------------------------------------------------------

/// Resolves a `./` or `../` path against the directory of `base`.
/// The result always ends in `/`.
fn resolve_relative(base: &str, relative: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base)?.join(relative)?;
    url.set_fragment(None);
    url.set_query(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.into())
}

/// Whether navigation parameters are worth appending.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
