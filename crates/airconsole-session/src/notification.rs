//! What the reconciler tells the application.

use airconsole_protocol::{DeviceId, DeviceRecord, ProfileUpdate, SafeArea};
use serde_json::Value;

/// One application-visible consequence of an inbound event.
///
/// [`Session::apply`](crate::Session::apply) returns these in the order
/// they must be delivered. Most map one-to-one onto an inbound action;
/// `update` and `ready` can produce several.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The session is up. Fired once.
    Ready { code: Option<Value> },

    /// A device loaded this game.
    Connect { device_id: DeviceId },

    /// A device left this game.
    Disconnect { device_id: DeviceId },

    /// A device's record was replaced (`None` = removed).
    DeviceStateChange {
        device_id: DeviceId,
        record: Option<DeviceRecord>,
    },

    /// A device's custom state changed. `Null` if it no longer has one.
    CustomDeviceStateChange { device_id: DeviceId, custom: Value },

    /// The active-player order changed. Carries this page's own player
    /// number under the new order.
    ActivePlayersChange { player_number: Option<usize> },

    /// A device became premium.
    Premium { device_id: DeviceId },

    /// A device's nickname, picture or login state changed.
    DeviceProfileChange { device_id: DeviceId },

    /// A message from a device in this game.
    Message { from: DeviceId, data: Value },

    DeviceMotion { data: Value },

    /// Profile data sent for this page's own device.
    Profile(ProfileUpdate),

    EmailAddress { email: Option<String> },

    AdShow,

    AdComplete { ad_was_shown: bool },

    HighScores { highscores: Value },

    HighScoreStored { highscore: Value },

    PersistentDataStored { uid: Option<String> },

    PersistentDataLoaded { data: Value },

    Pause,

    Resume,

    SetSafeArea { safe_area: SafeArea },
}

impl Notification {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::Connect { .. } => "connect",
            Self::Disconnect { .. } => "disconnect",
            Self::DeviceStateChange { .. } => "device_state_change",
            Self::CustomDeviceStateChange { .. } => "custom_device_state_change",
            Self::ActivePlayersChange { .. } => "active_players_change",
            Self::Premium { .. } => "premium",
            Self::DeviceProfileChange { .. } => "device_profile_change",
            Self::Message { .. } => "message",
            Self::DeviceMotion { .. } => "device_motion",
            Self::Profile(_) => "profile",
            Self::EmailAddress { .. } => "email_address",
            Self::AdShow => "ad_show",
            Self::AdComplete { .. } => "ad_complete",
            Self::HighScores { .. } => "high_scores",
            Self::HighScoreStored { .. } => "high_score_stored",
            Self::PersistentDataStored { .. } => "persistent_data_stored",
            Self::PersistentDataLoaded { .. } => "persistent_data_loaded",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::SetSafeArea { .. } => "set_safe_area",
        }
    }
}
