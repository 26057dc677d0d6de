//! The `EventHandler` trait: the application's side of the session.
//!
//! Applications implement only the callbacks they care about; every
//! method has an empty default. Each callback receives the session
//! mutably: queries (`nickname`, `player_number`, ...) see state that
//! already reflects the event, and commands issued from a callback land
//! in the outbox, which the owner flushes once dispatch returns.
//!
//! `Session::set_active_players(Some(0))` returns the notifications of
//! the replayed updates. A handler that ends a round from inside a
//! callback passes them to [`dispatch`] itself.
//!
//! # Example
//!
//! ```rust
//! use airconsole_protocol::DeviceId;
//! use airconsole_session::{EventHandler, Session};
//!
//! /// Starts the round as soon as two controllers are in.
//! #[derive(Default)]
//! struct Lobby {
//!     joined: Vec<DeviceId>,
//! }
//!
//! impl EventHandler for Lobby {
//!     fn on_connect(&mut self, session: &mut Session, device_id: DeviceId) {
//!         self.joined.push(device_id);
//!         if session.is_screen() && session.controller_device_ids().len() == 2 {
//!             let _ = session.set_active_players(Some(2));
//!         }
//!     }
//! }
//! ```

use airconsole_protocol::{DeviceId, DeviceRecord, ProfileUpdate, SafeArea};
use serde_json::Value;

use crate::{Notification, Session};

#[allow(unused_variables)]
pub trait EventHandler: 'static {
    fn on_ready(&mut self, session: &mut Session, code: Option<&Value>) {}

    fn on_connect(&mut self, session: &mut Session, device_id: DeviceId) {}

    fn on_disconnect(&mut self, session: &mut Session, device_id: DeviceId) {}

    fn on_device_state_change(
        &mut self,
        session: &mut Session,
        device_id: DeviceId,
        record: Option<&DeviceRecord>,
    ) {
    }

    fn on_custom_device_state_change(
        &mut self,
        session: &mut Session,
        device_id: DeviceId,
        custom: &Value,
    ) {
    }

    /// `player_number` is this page's own number under the new order.
    fn on_active_players_change(&mut self, session: &mut Session, player_number: Option<usize>) {}

    fn on_premium(&mut self, session: &mut Session, device_id: DeviceId) {}

    fn on_device_profile_change(&mut self, session: &mut Session, device_id: DeviceId) {}

    fn on_message(&mut self, session: &mut Session, from: DeviceId, data: &Value) {}

    fn on_device_motion(&mut self, session: &mut Session, data: &Value) {}

    fn on_profile(&mut self, session: &mut Session, profile: &ProfileUpdate) {}

    fn on_email_address(&mut self, session: &mut Session, email: Option<&str>) {}

    fn on_ad_show(&mut self, session: &mut Session) {}

    fn on_ad_complete(&mut self, session: &mut Session, ad_was_shown: bool) {}

    fn on_high_scores(&mut self, session: &mut Session, highscores: &Value) {}

    fn on_high_score_stored(&mut self, session: &mut Session, highscore: &Value) {}

    fn on_persistent_data_stored(&mut self, session: &mut Session, uid: Option<&str>) {}

    fn on_persistent_data_loaded(&mut self, session: &mut Session, data: &Value) {}

    fn on_pause(&mut self, session: &mut Session) {}

    fn on_resume(&mut self, session: &mut Session) {}

    fn on_set_safe_area(&mut self, session: &mut Session, safe_area: SafeArea) {}
}

/// Routes one notification to the matching `on_*` callback.
pub fn dispatch<H: EventHandler + ?Sized>(
    handler: &mut H,
    session: &mut Session,
    notification: &Notification,
) {
    match notification {
        Notification::Ready { code } => handler.on_ready(session, code.as_ref()),
        Notification::Connect { device_id } => handler.on_connect(session, *device_id),
        Notification::Disconnect { device_id } => handler.on_disconnect(session, *device_id),
        Notification::DeviceStateChange { device_id, record } => {
            handler.on_device_state_change(session, *device_id, record.as_ref())
        }
        Notification::CustomDeviceStateChange { device_id, custom } => {
            handler.on_custom_device_state_change(session, *device_id, custom)
        }
        Notification::ActivePlayersChange { player_number } => {
            handler.on_active_players_change(session, *player_number)
        }
        Notification::Premium { device_id } => handler.on_premium(session, *device_id),
        Notification::DeviceProfileChange { device_id } => {
            handler.on_device_profile_change(session, *device_id)
        }
        Notification::Message { from, data } => handler.on_message(session, *from, data),
        Notification::DeviceMotion { data } => handler.on_device_motion(session, data),
        Notification::Profile(profile) => handler.on_profile(session, profile),
        Notification::EmailAddress { email } => {
            handler.on_email_address(session, email.as_deref())
        }
        Notification::AdShow => handler.on_ad_show(session),
        Notification::AdComplete { ad_was_shown } => {
            handler.on_ad_complete(session, *ad_was_shown)
        }
        Notification::HighScores { highscores } => handler.on_high_scores(session, highscores),
        Notification::HighScoreStored { highscore } => {
            handler.on_high_score_stored(session, highscore)
        }
        Notification::PersistentDataStored { uid } => {
            handler.on_persistent_data_stored(session, uid.as_deref())
        }
        Notification::PersistentDataLoaded { data } => {
            handler.on_persistent_data_loaded(session, data)
        }
        Notification::Pause => handler.on_pause(session),
        Notification::Resume => handler.on_resume(session),
        Notification::SetSafeArea { safe_area } => handler.on_set_safe_area(session, *safe_area),
    }
}
