//! Applying inbound events to the session.
//!
//! Events are applied one at a time, in delivery order, and each call
//! returns the notifications it produced in the order the application
//! must see them. Nothing here blocks or performs I/O.

use airconsole_protocol::{DeviceId, DeviceUpdate, InboundEvent, ReadySnapshot};
use serde_json::Value;

use crate::{DeviceDirectory, LocationChange, Notification, Session, SilencedQueue};

impl Session {
    /// Applies one inbound event and returns the resulting notifications.
    pub fn apply(&mut self, event: InboundEvent) -> Vec<Notification> {
        tracing::trace!(action = event.action(), "applying event");

        let mut out = Vec::new();
        match event {
            InboundEvent::Ready(snapshot) => self.handle_ready(snapshot, &mut out),

            InboundEvent::Update { device_id, device_data } => {
                self.handle_update(device_id, device_data, &mut out)
            }

            InboundEvent::Message { from, to, data } => {
                if self.accepts_message(from, to) {
                    out.push(Notification::Message { from, data });
                } else {
                    tracing::debug!(%from, to = ?to, "message dropped");
                }
            }

            InboundEvent::DeviceMotion { data } => out.push(Notification::DeviceMotion { data }),

            InboundEvent::Profile(profile) => out.push(Notification::Profile(profile)),

            InboundEvent::Email { email } => out.push(Notification::EmailAddress { email }),

            InboundEvent::Ad { complete: None } => out.push(Notification::AdShow),
            InboundEvent::Ad { complete: Some(ad_was_shown) } => {
                out.push(Notification::AdComplete { ad_was_shown })
            }

            InboundEvent::HighScores { highscores } => {
                out.push(Notification::HighScores { highscores })
            }

            InboundEvent::HighScore { highscore } => {
                out.push(Notification::HighScoreStored { highscore })
            }

            InboundEvent::PersistentStore { uid } => {
                out.push(Notification::PersistentDataStored { uid })
            }

            InboundEvent::PersistentRequest { data } => {
                out.push(Notification::PersistentDataLoaded { data })
            }

            InboundEvent::Premium { device_id } => {
                if !self.directory.mark_premium(device_id) {
                    tracing::warn!(%device_id, "premium event for unknown device");
                }
                out.push(Notification::Premium { device_id });
            }

            InboundEvent::Pause => out.push(Notification::Pause),

            InboundEvent::Resume => out.push(Notification::Resume),

            InboundEvent::Debug { debug: request } => {
                tracing::debug!(request = ?request, "host debug request ignored");
            }

            InboundEvent::SetGameSafeArea { game_safe_area } => {
                self.game_safe_area = Some(game_safe_area);
                out.push(Notification::SetSafeArea { safe_area: game_safe_area });
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // ready
    // -----------------------------------------------------------------------

    /// Replaces all state with the host's snapshot, then announces every
    /// peer already in the game.
    ///
    /// `Ready` comes first, ahead of the catch-up notifications.
    fn handle_ready(&mut self, snapshot: ReadySnapshot, out: &mut Vec<Notification>) {
        let own_id = snapshot.device_id;

        self.device_id = Some(own_id);
        self.directory = DeviceDirectory::from_snapshot(snapshot.devices);
        self.silenced = SilencedQueue::new();
        if self.config.synchronize_time {
            self.server_time_offset = Some(snapshot.server_time_offset.unwrap_or(0.0));
        }
        self.game_safe_area = snapshot.game_safe_area;

        tracing::info!(
            device_id = %own_id,
            devices = self.directory.len(),
            "session ready"
        );

        out.push(Notification::Ready { code: snapshot.code });

        let peers: Vec<DeviceId> = self
            .directory
            .iter()
            .map(|(id, _)| id)
            .filter(|id| *id != own_id && self.is_in_game(*id))
            .collect();

        for device_id in peers {
            out.push(Notification::Connect { device_id });

            let Some(record) = self.directory.get(device_id) else {
                continue;
            };
            if let Some(custom) = record.custom_state() {
                out.push(Notification::CustomDeviceStateChange {
                    device_id,
                    custom: custom.clone(),
                });
            }
            if device_id.is_screen() && record.players.is_some() {
                out.push(Notification::ActivePlayersChange {
                    player_number: self.own_player_number(),
                });
            }
            if self.is_premium(Some(device_id)) == Some(true) {
                out.push(Notification::Premium { device_id });
            }
        }

        if let Some(safe_area) = self.game_safe_area {
            out.push(Notification::SetSafeArea { safe_area });
        }
    }

    // -----------------------------------------------------------------------
    // update
    // -----------------------------------------------------------------------

    /// Applies (or parks) one device's new record.
    pub(crate) fn handle_update(
        &mut self,
        device_id: DeviceId,
        update: Option<DeviceUpdate>,
        out: &mut Vec<Notification>,
    ) {
        if !self.is_ready() {
            tracing::debug!(%device_id, "update before ready ignored");
            return;
        }

        let after = self.game_identity(
            update
                .as_ref()
                .and_then(|update| update.record.location.as_deref()),
        );

        if self.is_silenced(Some(device_id)) {
            self.park_update(device_id, update, after);
            return;
        }

        let before = self.location_of(device_id);
        let change =
            LocationChange::classify(before.as_deref(), self.game_url.as_deref(), after.as_deref());
        let in_game = after.is_some() && after == self.game_url;
        let changes = update.as_ref().map(|update| update.changes).unwrap_or_default();
        let record = update.map(|update| update.record);

        self.directory.replace(device_id, record.clone());
        out.push(Notification::DeviceStateChange { device_id, record });

        match change {
            LocationChange::Connect => {
                tracing::info!(%device_id, "device connected");
                out.push(Notification::Connect { device_id });
            }
            LocationChange::Disconnect => {
                tracing::info!(%device_id, "device disconnected");
                out.push(Notification::Disconnect { device_id });
            }
            LocationChange::Unchanged => {}
        }
        let is_connect = change == LocationChange::Connect;

        let Some(record) = self.directory.get(device_id) else {
            return;
        };

        if (changes.custom && in_game) || (is_connect && record.custom_state().is_some()) {
            out.push(Notification::CustomDeviceStateChange {
                device_id,
                custom: record.custom.clone().unwrap_or(Value::Null),
            });
        }

        // Replacing the Screen's record already dropped the player cache.
        if (changes.players && in_game)
            || (device_id.is_screen() && record.players.is_some() && is_connect)
        {
            out.push(Notification::ActivePlayersChange {
                player_number: self.own_player_number(),
            });
        }

        if record.premium && (changes.premium || is_connect) {
            out.push(Notification::Premium { device_id });
        }

        if changes.profile {
            out.push(Notification::DeviceProfileChange { device_id });
        }
    }

    /// Queues an update from a silenced device instead of applying it.
    ///
    /// The "before" side is the device's projected location: its latest
    /// parked update if there is one, its directory record otherwise. A
    /// departure that undoes a parked arrival removes that arrival and is
    /// itself dropped.
    fn park_update(&mut self, device_id: DeviceId, update: Option<DeviceUpdate>, after: Option<String>) {
        let before = match self.silenced.projected(device_id) {
            Some(projected) => {
                self.game_identity(projected.and_then(|record| record.location.as_deref()))
            }
            None => self.location_of(device_id),
        };
        let change =
            LocationChange::classify(before.as_deref(), self.game_url.as_deref(), after.as_deref());

        if change == LocationChange::Disconnect && self.silenced.cancel_pending_connect(device_id) {
            tracing::debug!(%device_id, "silenced connect and leave cancelled out");
            return;
        }

        self.silenced
            .push(device_id, update, change == LocationChange::Connect);
        tracing::debug!(
            %device_id,
            queued = self.silenced.queued_for(device_id),
            "update from silenced device queued"
        );
    }

    // -----------------------------------------------------------------------
    // message
    // -----------------------------------------------------------------------

    fn accepts_message(&self, from: DeviceId, to: Option<DeviceId>) -> bool {
        self.is_ready()
            && self.is_in_game(from)
            && !self.is_silenced(Some(from))
            && !self.is_silenced(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airconsole_protocol::{ChangeSet, DeviceRecord, ProfileUpdate, SafeArea};
    use serde_json::json;

    use crate::SessionConfig;

    const GAME: &str = "http://games.example/pong/";
    const SCREEN_URL: &str = "http://games.example/pong/screen.html";
    const CONTROLLER_URL: &str = "http://games.example/pong/controller.html";
    const ELSEWHERE: &str = "http://games.example/other/controller.html";

    fn id(n: u32) -> DeviceId {
        DeviceId(n)
    }

    fn at(location: &str) -> DeviceRecord {
        DeviceRecord::at(location)
    }

    fn snapshot(own: u32, devices: Vec<Option<DeviceRecord>>) -> InboundEvent {
        InboundEvent::Ready(ReadySnapshot {
            device_id: id(own),
            devices,
            code: Some(json!("1234")),
            server_time_offset: None,
            game_safe_area: None,
        })
    }

    fn update(device: u32, record: Option<DeviceRecord>, changes: ChangeSet) -> InboundEvent {
        InboundEvent::Update {
            device_id: id(device),
            device_data: record.map(|record| DeviceUpdate::new(record).with_changes(changes)),
        }
    }

    fn screen_session(devices: Vec<Option<DeviceRecord>>) -> Session {
        let mut session = Session::new(SessionConfig::new(SCREEN_URL));
        session.apply(snapshot(0, devices));
        session
    }

    fn names(notifications: &[Notification]) -> Vec<&'static str> {
        notifications.iter().map(Notification::name).collect()
    }

    // =====================================================================
    // ready
    // =====================================================================

    #[test]
    fn test_apply_ready_fires_ready_before_catch_up() {
        let mut session = Session::new(SessionConfig::new(CONTROLLER_URL));
        let mut peer = at(CONTROLLER_URL);
        peer.custom = Some(json!({ "team": "red" }));
        peer.premium = true;

        let out = session.apply(snapshot(1, vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL)), Some(peer)]));

        assert_eq!(
            names(&out),
            vec!["ready", "connect", "connect", "custom_device_state_change", "premium"]
        );
        assert_eq!(out[0], Notification::Ready { code: Some(json!("1234")) });
        assert_eq!(out[1], Notification::Connect { device_id: id(0) });
        assert_eq!(out[2], Notification::Connect { device_id: id(2) });
        assert_eq!(session.device_id(), Some(id(1)));
    }

    #[test]
    fn test_apply_ready_skips_self_and_foreign_devices() {
        let mut session = Session::new(SessionConfig::new(SCREEN_URL));

        let out = session.apply(snapshot(0, vec![Some(at(SCREEN_URL)), Some(at(ELSEWHERE)), None]));

        assert_eq!(names(&out), vec!["ready"]);
    }

    #[test]
    fn test_apply_ready_announces_existing_active_players() {
        let mut screen = at(SCREEN_URL);
        screen.players = Some(vec![id(2), id(1)]);
        let mut session = Session::new(SessionConfig::new(CONTROLLER_URL));

        let out = session.apply(snapshot(
            1,
            vec![Some(screen), Some(at(CONTROLLER_URL)), Some(at(CONTROLLER_URL))],
        ));

        assert!(out.contains(&Notification::ActivePlayersChange { player_number: Some(1) }));
    }

    #[test]
    fn test_apply_ready_safe_area_fires_last() {
        let area = SafeArea { top: 0.1, left: 0.0, bottom: 0.9, right: 1.0 };
        let mut session = Session::new(SessionConfig::new(SCREEN_URL));

        let out = session.apply(InboundEvent::Ready(ReadySnapshot {
            device_id: id(0),
            devices: vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL))],
            code: None,
            server_time_offset: None,
            game_safe_area: Some(area),
        }));

        assert_eq!(out.last(), Some(&Notification::SetSafeArea { safe_area: area }));
        assert_eq!(session.game_safe_area(), Some(area));
    }

    // =====================================================================
    // update
    // =====================================================================

    #[test]
    fn test_handle_update_before_ready_is_ignored() {
        let mut session = Session::new(SessionConfig::new(SCREEN_URL));
        let out = session.apply(update(1, Some(at(CONTROLLER_URL)), ChangeSet::default()));
        assert!(out.is_empty());
        assert!(session.directory().is_empty());
    }

    #[test]
    fn test_handle_update_arrival_fires_connect_with_state() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL))]);
        let mut record = at(CONTROLLER_URL);
        record.custom = Some(json!({ "ready": true }));

        let out = session.apply(update(1, Some(record.clone()), ChangeSet::default()));

        assert_eq!(
            out,
            vec![
                Notification::DeviceStateChange { device_id: id(1), record: Some(record) },
                Notification::Connect { device_id: id(1) },
                Notification::CustomDeviceStateChange {
                    device_id: id(1),
                    custom: json!({ "ready": true }),
                },
            ]
        );
    }

    #[test]
    fn test_handle_update_departure_fires_disconnect() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL))]);

        let out = session.apply(update(1, None, ChangeSet::default()));

        assert_eq!(
            out,
            vec![
                Notification::DeviceStateChange { device_id: id(1), record: None },
                Notification::Disconnect { device_id: id(1) },
            ]
        );
        assert!(session.device(id(1)).is_none());
    }

    #[test]
    fn test_handle_update_custom_flag_requires_in_game() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL)), Some(at(ELSEWHERE))]);
        let flags = ChangeSet { custom: true, ..ChangeSet::default() };

        let out = session.apply(update(1, Some(at(ELSEWHERE)), flags));
        assert_eq!(names(&out), vec!["device_state_change"]);

        let out = session.apply(update(1, Some(at(CONTROLLER_URL)), flags));
        assert_eq!(
            names(&out),
            vec!["device_state_change", "connect", "custom_device_state_change"]
        );
        assert_eq!(
            out[2],
            Notification::CustomDeviceStateChange { device_id: id(1), custom: Value::Null }
        );
    }

    #[test]
    fn test_handle_update_players_flag_reports_own_number() {
        let mut session = Session::new(SessionConfig::new(CONTROLLER_URL));
        session.apply(snapshot(
            2,
            vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL)), Some(at(CONTROLLER_URL))],
        ));
        let mut screen = at(SCREEN_URL);
        screen.players = Some(vec![id(2), id(1)]);

        let out = session.apply(update(
            0,
            Some(screen),
            ChangeSet { players: true, ..ChangeSet::default() },
        ));

        assert_eq!(
            out.last(),
            Some(&Notification::ActivePlayersChange { player_number: Some(0) })
        );
        assert_eq!(session.convert_device_id_to_player_number(id(1)), Some(1));
    }

    #[test]
    fn test_handle_update_premium_and_profile_flags() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL))]);
        let mut record = at(CONTROLLER_URL);
        record.premium = true;

        let out = session.apply(update(
            1,
            Some(record),
            ChangeSet { premium: true, profile: true, ..ChangeSet::default() },
        ));

        assert_eq!(
            names(&out),
            vec!["device_state_change", "premium", "device_profile_change"]
        );
    }

    #[test]
    fn test_handle_update_premium_without_flag_is_quiet() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL))]);
        let mut record = at(CONTROLLER_URL);
        record.premium = true;

        let out = session.apply(update(1, Some(record), ChangeSet::default()));

        assert_eq!(names(&out), vec!["device_state_change"]);
    }

    // =====================================================================
    // silenced updates
    // =====================================================================

    fn silenced_round() -> Session {
        let mut session = screen_session(vec![
            Some(at(SCREEN_URL)),
            Some(at(CONTROLLER_URL)),
        ]);
        session.directory.set_active_players(vec![id(1)]);
        session
    }

    #[test]
    fn test_handle_update_silenced_device_is_queued() {
        let mut session = silenced_round();

        let out = session.apply(update(2, Some(at(CONTROLLER_URL)), ChangeSet::default()));

        assert!(out.is_empty());
        assert!(session.device(id(2)).is_none());
        assert_eq!(session.silenced_updates().queued_for(id(2)), 1);
    }

    #[test]
    fn test_handle_update_silenced_connect_then_leave_cancels_out() {
        let mut session = silenced_round();

        session.apply(update(2, Some(at(CONTROLLER_URL)), ChangeSet::default()));
        let out = session.apply(update(2, None, ChangeSet::default()));

        assert!(out.is_empty());
        assert!(session.silenced_updates().is_empty());
    }

    #[test]
    fn test_handle_update_silenced_leave_without_queued_connect_is_queued() {
        let mut session = screen_session(vec![
            Some(at(SCREEN_URL)),
            Some(at(CONTROLLER_URL)),
            Some(at(CONTROLLER_URL)),
        ]);
        session.directory.set_active_players(vec![id(1)]);

        session.apply(update(2, None, ChangeSet::default()));

        assert_eq!(session.silenced_updates().queued_for(id(2)), 1);
        assert!(session.device(id(2)).is_some());
    }

    // =====================================================================
    // message & pass-through
    // =====================================================================

    #[test]
    fn test_apply_message_from_in_game_device_is_delivered() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL))]);

        let out = session.apply(InboundEvent::Message { from: id(1), to: None, data: json!(7) });

        assert_eq!(out, vec![Notification::Message { from: id(1), data: json!(7) }]);
    }

    #[test]
    fn test_apply_message_from_foreign_device_is_dropped() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL)), Some(at(ELSEWHERE))]);

        let out = session.apply(InboundEvent::Message { from: id(1), to: None, data: json!(7) });

        assert!(out.is_empty());
    }

    #[test]
    fn test_apply_message_before_ready_is_dropped() {
        let mut session = Session::new(SessionConfig::new(SCREEN_URL));
        let out = session.apply(InboundEvent::Message { from: id(0), to: None, data: json!(1) });
        assert!(out.is_empty());
    }

    #[test]
    fn test_apply_premium_marks_record() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL)), Some(at(CONTROLLER_URL))]);

        let out = session.apply(InboundEvent::Premium { device_id: id(1) });

        assert_eq!(out, vec![Notification::Premium { device_id: id(1) }]);
        assert_eq!(session.is_premium(Some(id(1))), Some(true));
    }

    #[test]
    fn test_apply_profile_passes_through_without_mutation() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL))]);
        let profile = ProfileUpdate { auth: Some(true), nickname: Some("Bo".into()), picture: None };

        let out = session.apply(InboundEvent::Profile(profile.clone()));

        assert_eq!(out, vec![Notification::Profile(profile)]);
        assert_eq!(session.device(id(0)).and_then(|r| r.nickname.clone()), None);
    }

    #[test]
    fn test_apply_ad_maps_show_and_complete() {
        let mut session = Session::new(SessionConfig::new(SCREEN_URL));
        assert_eq!(session.apply(InboundEvent::Ad { complete: None }), vec![Notification::AdShow]);
        assert_eq!(
            session.apply(InboundEvent::Ad { complete: Some(false) }),
            vec![Notification::AdComplete { ad_was_shown: false }]
        );
    }

    #[test]
    fn test_apply_debug_produces_nothing() {
        let mut session = Session::new(SessionConfig::new(SCREEN_URL));
        assert!(session.apply(InboundEvent::Debug { debug: Some("fps".into()) }).is_empty());
    }

    #[test]
    fn test_apply_game_url_is_scheme_insensitive() {
        let mut session = screen_session(vec![Some(at(SCREEN_URL))]);
        let out = session.apply(update(
            1,
            Some(at("https://games.example/pong/controller.html?x=1")),
            ChangeSet::default(),
        ));
        assert!(out.contains(&Notification::Connect { device_id: id(1) }));
        assert_eq!(session.game_url(), Some(GAME));
    }
}
