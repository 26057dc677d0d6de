//! Data types that appear inside protocol events.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A device's index in the session.
///
/// Index 0 is reserved for the Screen; every other index is a Controller.
/// An index stays reserved for the device that first got it, so ids are
/// never reused within a session.
///
/// `#[serde(transparent)]` keeps the wire shape a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl DeviceId {
    /// The Screen's device id.
    pub const SCREEN: DeviceId = DeviceId(0);

    /// Returns `true` for the Screen.
    pub fn is_screen(self) -> bool {
        self == Self::SCREEN
    }

    /// Returns `true` for any Controller.
    pub fn is_controller(self) -> bool {
        !self.is_screen()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DeviceRecord
// ---------------------------------------------------------------------------

/// One device's state as last reported by the host.
///
/// Most fields are passthrough payload; the reconciler only reads
/// `location`, `custom`, `premium`, `players` and `silence_players`.
/// Fields this type doesn't name (`client`, `environment`,
/// `slow_connection`, …) survive in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceRecord {
    /// Globally unique, stable per user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Raw URL of the page the device last loaded. Only ever compared
    /// after normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Profile picture version, appended to picture URLs as `v=`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<Value>,

    /// IETF language tag, e.g. `en-US`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Whether the user is logged in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub premium: bool,

    /// Application-defined state, propagated to every peer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,

    /// Active-player order. Only the Screen's record carries this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<DeviceId>>,

    /// Host-side silencing switch. Only the Screen's record carries this.
    #[serde(rename = "silencePlayers", skip_serializing_if = "Option::is_none")]
    pub silence_players: Option<bool>,

    /// Everything else the host sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceRecord {
    /// Creates an otherwise empty record at `location`.
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    /// Returns the custom state if one is set and not `null`.
    pub fn custom_state(&self) -> Option<&Value> {
        self.custom.as_ref().filter(|v| !v.is_null())
    }

    /// Returns `true` if the host client can open external URLs itself.
    pub fn passes_external_urls(&self) -> bool {
        self.extra
            .get("client")
            .and_then(|client| client.get("pass_external_url"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// SafeArea
// ---------------------------------------------------------------------------

/// The part of the Screen that is safe to draw into.
///
/// Normalized coordinates: 0 is top/left, 1 is bottom/right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SafeArea {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// Orientation & vibration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// The wire name, as sent in a `set orientation` command.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Haptic feedback request for a controller.
///
/// `#[serde(untagged)]` because the host accepts either a bare number of
/// milliseconds or a `{ "type": "composition", "value": [...] }` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vibration {
    /// Vibrate for this many milliseconds.
    Millis(u64),
    /// Play back a sequence of primitives.
    Composition {
        #[serde(rename = "type")]
        kind: CompositionKind,
        value: Vec<CompositionVibration>,
    },
}

impl Vibration {
    /// Builds a composition pattern from its steps.
    pub fn composition(steps: Vec<CompositionVibration>) -> Self {
        Self::Composition {
            kind: CompositionKind::Composition,
            value: steps,
        }
    }
}

/// The only vibration interface the host currently understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionKind {
    Composition,
}

/// One step in a composition vibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionVibration {
    pub primitive: VibrationPrimitive,
    /// Between 0.0 and 1.0.
    pub scale: f64,
    /// Milliseconds to wait before this step plays.
    #[serde(default)]
    pub delay: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VibrationPrimitive {
    #[serde(rename = "primitiveClick")]
    Click,
    #[serde(rename = "primitiveThud")]
    Thud,
    #[serde(rename = "primitiveSpin")]
    Spin,
    #[serde(rename = "primitiveQuickRise")]
    QuickRise,
    #[serde(rename = "primitiveSlowRise")]
    SlowRise,
    #[serde(rename = "primitiveQuickFall")]
    QuickFall,
    #[serde(rename = "primitiveTick")]
    Tick,
    #[serde(rename = "primitiveLowTick")]
    LowTick,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&DeviceId(4)).unwrap(), "4");
    }

    #[test]
    fn test_device_id_screen_is_zero() {
        assert!(DeviceId(0).is_screen());
        assert!(DeviceId(1).is_controller());
        assert_eq!(DeviceId::SCREEN.to_string(), "D-0");
    }

    #[test]
    fn test_device_record_keeps_unknown_fields_in_extra() {
        let record: DeviceRecord = serde_json::from_value(json!({
            "uid": "u-1",
            "location": "http://game/controller.html",
            "slow_connection": true,
            "client": { "pass_external_url": true }
        }))
        .unwrap();

        assert_eq!(record.uid.as_deref(), Some("u-1"));
        assert_eq!(record.extra["slow_connection"], true);
        assert!(record.passes_external_urls());
    }

    #[test]
    fn test_device_record_reads_screen_only_fields() {
        let record: DeviceRecord = serde_json::from_value(json!({
            "players": [2, 3],
            "silencePlayers": true
        }))
        .unwrap();

        assert_eq!(record.players, Some(vec![DeviceId(2), DeviceId(3)]));
        assert_eq!(record.silence_players, Some(true));
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_device_record_null_custom_is_not_a_custom_state() {
        let record: DeviceRecord =
            serde_json::from_value(json!({ "custom": null })).unwrap();
        assert!(record.custom_state().is_none());
    }

    #[test]
    fn test_device_record_skips_defaults_when_serialized() {
        let json = serde_json::to_value(DeviceRecord::at("http://x/")).unwrap();
        assert_eq!(json, json!({ "location": "http://x/" }));
    }

    #[test]
    fn test_vibration_millis_is_a_bare_number() {
        assert_eq!(serde_json::to_value(Vibration::Millis(250)).unwrap(), json!(250));
    }

    #[test]
    fn test_vibration_composition_json_format() {
        let vibration = Vibration::composition(vec![CompositionVibration {
            primitive: VibrationPrimitive::QuickRise,
            scale: 0.5,
            delay: 20,
        }]);
        let json = serde_json::to_value(vibration).unwrap();

        assert_eq!(json["type"], "composition");
        assert_eq!(json["value"][0]["primitive"], "primitiveQuickRise");
        assert_eq!(json["value"][0]["delay"], 20);
    }

    #[test]
    fn test_orientation_is_lowercase() {
        assert_eq!(
            serde_json::to_value(Orientation::Landscape).unwrap(),
            json!("landscape")
        );
        assert_eq!(Orientation::Portrait.as_str(), "portrait");
    }
}
