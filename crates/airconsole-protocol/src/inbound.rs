//! Events the host frame posts to the page.
//!
//! Every inbound message carries an `action` discriminator. It is decoded
//! exactly once, here, into [`InboundEvent`]; an unknown action is a
//! decode error.

use serde::Deserialize;
use serde_json::Value;

use crate::{DeviceId, DeviceRecord, SafeArea};

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// Which parts of a device record an `update` claims to have changed.
///
/// On the wire these are loose boolean fields mixed into the device data
/// (`_is_custom_update`, `_is_players_update`, …). They are lifted out
/// here so the record itself stays clean and the reconciler matches on
/// typed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeSet {
    pub custom: bool,
    pub players: bool,
    pub premium: bool,
    pub profile: bool,
}

impl ChangeSet {
    /// Returns `true` if no flag is set.
    pub fn is_empty(&self) -> bool {
        !(self.custom || self.players || self.premium || self.profile)
    }
}

// ---------------------------------------------------------------------------
// DeviceUpdate
// ---------------------------------------------------------------------------

/// The `device_data` of an `update` event: the device's new record plus
/// the change flags that came with it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireDeviceData")]
pub struct DeviceUpdate {
    pub record: DeviceRecord,
    pub changes: ChangeSet,
}

impl DeviceUpdate {
    /// An update with no change flags.
    pub fn new(record: DeviceRecord) -> Self {
        Self {
            record,
            changes: ChangeSet::default(),
        }
    }

    /// Same update with `changes` attached.
    pub fn with_changes(mut self, changes: ChangeSet) -> Self {
        self.changes = changes;
        self
    }
}

/// Exact wire shape of `device_data`.
#[derive(Deserialize)]
struct WireDeviceData {
    #[serde(rename = "_is_custom_update", default)]
    custom: bool,
    #[serde(rename = "_is_players_update", default)]
    players: bool,
    #[serde(rename = "_is_premium_update", default)]
    premium: bool,
    #[serde(rename = "_is_profile_update", default)]
    profile: bool,
    #[serde(flatten)]
    record: DeviceRecord,
}

impl From<WireDeviceData> for DeviceUpdate {
    fn from(wire: WireDeviceData) -> Self {
        Self {
            record: wire.record,
            changes: ChangeSet {
                custom: wire.custom,
                players: wire.players,
                premium: wire.premium,
                profile: wire.profile,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Ready snapshot & profile payloads
// ---------------------------------------------------------------------------

/// Payload of the `ready` event: the authoritative session snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadySnapshot {
    /// This page's own device id.
    pub device_id: DeviceId,

    /// Every device slot, indexed by device id. `null` marks a hole.
    #[serde(default)]
    pub devices: Vec<Option<DeviceRecord>>,

    /// Join code shown to players.
    #[serde(default)]
    pub code: Option<Value>,

    /// Milliseconds to add to local time to get server time.
    #[serde(default)]
    pub server_time_offset: Option<f64>,

    #[serde(rename = "gameSafeArea", default)]
    pub game_safe_area: Option<SafeArea>,
}

/// Payload of the `profile` event.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub auth: Option<bool>,
    pub nickname: Option<String>,
    pub picture: Option<Value>,
}

// ---------------------------------------------------------------------------
// InboundEvent
// ---------------------------------------------------------------------------

/// Everything the host frame can post to the page.
///
/// `#[serde(tag = "action")]` reads the discriminator from the same
/// object as the payload fields:
///   `{ "action": "update", "device_id": 2, "device_data": {...} }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action")]
pub enum InboundEvent {
    /// The session is up. Carries the full device directory.
    #[serde(rename = "ready")]
    Ready(ReadySnapshot),

    /// One device's record changed. A missing `device_data` means the
    /// device left the session.
    #[serde(rename = "update")]
    Update {
        device_id: DeviceId,
        #[serde(default)]
        device_data: Option<DeviceUpdate>,
    },

    /// A message from another device.
    #[serde(rename = "message")]
    Message {
        from: DeviceId,
        #[serde(default)]
        to: Option<DeviceId>,
        #[serde(default)]
        data: Value,
    },

    /// Accelerometer / gyroscope sample.
    #[serde(rename = "device_motion")]
    DeviceMotion {
        #[serde(default)]
        data: Value,
    },

    #[serde(rename = "profile")]
    Profile(ProfileUpdate),

    #[serde(rename = "email")]
    Email {
        #[serde(default)]
        email: Option<String>,
    },

    /// Ad lifecycle. No `complete` field means an ad started showing.
    #[serde(rename = "ad")]
    Ad {
        #[serde(default)]
        complete: Option<bool>,
    },

    #[serde(rename = "highscores")]
    HighScores {
        #[serde(default)]
        highscores: Value,
    },

    #[serde(rename = "highscore")]
    HighScore {
        #[serde(default)]
        highscore: Value,
    },

    #[serde(rename = "persistentstore")]
    PersistentStore {
        #[serde(default)]
        uid: Option<String>,
    },

    #[serde(rename = "persistentrequest")]
    PersistentRequest {
        #[serde(default)]
        data: Value,
    },

    /// A device became premium.
    #[serde(rename = "premium")]
    Premium { device_id: DeviceId },

    #[serde(rename = "pause")]
    Pause,

    #[serde(rename = "resume")]
    Resume,

    /// Host diagnostics request.
    #[serde(rename = "debug")]
    Debug {
        #[serde(default)]
        debug: Option<String>,
    },

    #[serde(rename = "setGameSafeArea")]
    SetGameSafeArea {
        #[serde(rename = "gameSafeArea")]
        game_safe_area: SafeArea,
    },
}

impl InboundEvent {
    /// The wire name of this event's action, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::Update { .. } => "update",
            Self::Message { .. } => "message",
            Self::DeviceMotion { .. } => "device_motion",
            Self::Profile(_) => "profile",
            Self::Email { .. } => "email",
            Self::Ad { .. } => "ad",
            Self::HighScores { .. } => "highscores",
            Self::HighScore { .. } => "highscore",
            Self::PersistentStore { .. } => "persistentstore",
            Self::PersistentRequest { .. } => "persistentrequest",
            Self::Premium { .. } => "premium",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Debug { .. } => "debug",
            Self::SetGameSafeArea { .. } => "setGameSafeArea",
        }
    }
}

#[cfg(test)]
mod tests {
    //! The host's JSON shapes are fixed; these tests pin our serde
    //! attributes to them.

    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> InboundEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_update_lifts_flags_out_of_the_record() {
        let event = decode(json!({
            "action": "update",
            "device_id": 2,
            "device_data": {
                "location": "http://game/controller.html",
                "custom": { "score": 3 },
                "_is_custom_update": true,
                "_is_profile_update": true
            }
        }));

        let InboundEvent::Update { device_id, device_data } = event else {
            panic!("expected update");
        };
        let update = device_data.expect("device data present");

        assert_eq!(device_id, DeviceId(2));
        assert!(update.changes.custom);
        assert!(update.changes.profile);
        assert!(!update.changes.players);
        assert!(!update.changes.premium);
        assert_eq!(update.record.custom, Some(json!({ "score": 3 })));
        assert!(
            update.record.extra.is_empty(),
            "flags must not leak into extra: {:?}",
            update.record.extra
        );
    }

    #[test]
    fn test_update_without_device_data_means_departure() {
        let event = decode(json!({ "action": "update", "device_id": 5 }));
        assert_eq!(
            event,
            InboundEvent::Update { device_id: DeviceId(5), device_data: None }
        );
    }

    #[test]
    fn test_update_with_null_device_data_means_departure() {
        let event =
            decode(json!({ "action": "update", "device_id": 5, "device_data": null }));
        assert!(matches!(event, InboundEvent::Update { device_data: None, .. }));
    }

    #[test]
    fn test_ready_snapshot_keeps_holes() {
        let event = decode(json!({
            "action": "ready",
            "device_id": 2,
            "code": "1234 5678",
            "devices": [{ "location": "http://game/screen.html" }, null, { "uid": "b" }],
            "server_time_offset": 120,
            "gameSafeArea": { "top": 0.1, "left": 0.0, "bottom": 0.9, "right": 1.0 }
        }));

        let InboundEvent::Ready(snapshot) = event else {
            panic!("expected ready");
        };
        assert_eq!(snapshot.device_id, DeviceId(2));
        assert_eq!(snapshot.devices.len(), 3);
        assert!(snapshot.devices[1].is_none());
        assert_eq!(snapshot.server_time_offset, Some(120.0));
        assert_eq!(snapshot.game_safe_area.map(|a| a.bottom), Some(0.9));
    }

    #[test]
    fn test_message_to_is_optional() {
        let event = decode(json!({ "action": "message", "from": 0, "data": "hi" }));
        assert_eq!(
            event,
            InboundEvent::Message { from: DeviceId(0), to: None, data: json!("hi") }
        );
    }

    #[test]
    fn test_unit_actions_decode() {
        assert_eq!(decode(json!({ "action": "pause" })), InboundEvent::Pause);
        assert_eq!(decode(json!({ "action": "resume" })), InboundEvent::Resume);
    }

    #[test]
    fn test_ad_without_complete_is_ad_show() {
        assert_eq!(
            decode(json!({ "action": "ad" })),
            InboundEvent::Ad { complete: None }
        );
        assert_eq!(
            decode(json!({ "action": "ad", "complete": true })),
            InboundEvent::Ad { complete: Some(true) }
        );
    }

    #[test]
    fn test_set_game_safe_area_uses_camel_case_field() {
        let event = decode(json!({
            "action": "setGameSafeArea",
            "gameSafeArea": { "top": 0.0, "left": 0.2, "bottom": 1.0, "right": 0.8 }
        }));
        assert_eq!(event.action(), "setGameSafeArea");
    }

    #[test]
    fn test_unknown_action_is_a_decode_error() {
        let result: Result<InboundEvent, _> =
            serde_json::from_value(json!({ "action": "teleport" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_action_is_a_decode_error() {
        let result: Result<InboundEvent, _> =
            serde_json::from_value(json!({ "device_id": 1 }));
        assert!(result.is_err());
    }
}
