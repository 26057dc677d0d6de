//! `AirConsole` client: wires transport, codec, session and handler.
//!
//! This is the entry point for a page. It ties together all the layers:
//! transport → protocol → session → your [`EventHandler`].

use airconsole_protocol::{Codec, DeviceId, InboundEvent, JsonCodec, Orientation, Vibration};
use airconsole_session::{dispatch, EventHandler, Notification, Session, SessionConfig};
use airconsole_transport::Transport;
use serde_json::Value;

use crate::AirConsoleError;

/// One page's connection to the AirConsole host.
///
/// Inbound bytes go in through [`handle_message`](Self::handle_message);
/// every notification they produce is dispatched to the handler before
/// the call returns. Commands queued by the session, including those the
/// handler issued from its callbacks, are posted afterwards.
///
/// Posting never fails from the caller's point of view: a transport error
/// is logged at `warn` and the command is dropped. The host link has no
/// acknowledgements, so there is nothing a caller could retry against.
pub struct AirConsole<T: Transport, H: EventHandler, C: Codec = JsonCodec> {
    transport: T,
    handler: H,
    codec: C,
    session: Session,
}

impl<T: Transport, H: EventHandler> AirConsole<T, H, JsonCodec> {
    /// Creates a client speaking JSON and posts the handshake.
    pub fn new(transport: T, handler: H, config: SessionConfig) -> Self {
        Self::with_session(transport, handler, JsonCodec, Session::new(config))
    }
}

impl<T: Transport, H: EventHandler, C: Codec> AirConsole<T, H, C> {
    /// Creates a client around an already constructed session (e.g. one
    /// with a custom location resolver) and posts its startup commands.
    pub fn with_session(transport: T, handler: H, codec: C, session: Session) -> Self {
        let mut client = Self {
            transport,
            handler,
            codec,
            session,
        };
        client.flush();
        client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the client and returns the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Decodes and applies one message from the host.
    ///
    /// Bytes that don't decode to a known event are logged at `debug`
    /// and ignored.
    pub fn handle_message(&mut self, data: &[u8]) {
        let event: InboundEvent = match self.codec.decode(data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, bytes = data.len(), "ignoring undecodable host message");
                return;
            }
        };
        self.handle_event(event);
    }

    /// Applies one already decoded event.
    pub fn handle_event(&mut self, event: InboundEvent) {
        let notifications = self.session.apply(event);
        self.deliver(&notifications);
    }

    fn deliver(&mut self, notifications: &[Notification]) {
        for notification in notifications {
            dispatch(&mut self.handler, &mut self.session, notification);
        }
        self.flush();
    }

    /// Posts every queued command.
    fn flush(&mut self) {
        for command in self.session.take_outbox() {
            let bytes = match self.codec.encode(&command) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, ?command, "failed to encode command");
                    continue;
                }
            };
            if let Err(e) = self.transport.post(&bytes) {
                tracing::warn!(error = %e, "failed to post command to host");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Sends `data` to one device, or to everyone else for `None`.
    pub fn message(&mut self, to: Option<DeviceId>, data: Value) {
        self.session.message(to, data);
        self.flush();
    }

    pub fn broadcast(&mut self, data: Value) {
        self.session.broadcast(data);
        self.flush();
    }

    pub fn set_custom_device_state(&mut self, data: Value) {
        self.session.set_custom_device_state(data);
        self.flush();
    }

    pub fn set_custom_device_state_property(
        &mut self,
        key: &str,
        value: Value,
    ) -> Result<(), AirConsoleError> {
        self.session.set_custom_device_state_property(key, value)?;
        self.flush();
        Ok(())
    }

    pub fn set_immersive_state(&mut self, state: Value) -> Result<(), AirConsoleError> {
        self.session.set_immersive_state(state)?;
        self.flush();
        Ok(())
    }

    /// Sets the active players (Screen only). `Some(0)` ends the round and
    /// replays deferred updates, whose notifications reach the handler
    /// before this returns.
    pub fn set_active_players(&mut self, max_players: Option<usize>) -> Result<(), AirConsoleError> {
        let notifications = self.session.set_active_players(max_players)?;
        self.deliver(&notifications);
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.session.set_orientation(orientation);
        self.flush();
    }

    pub fn vibrate(&mut self, vibration: Vibration) -> Result<(), AirConsoleError> {
        self.session.vibrate(vibration)?;
        self.flush();
        Ok(())
    }

    pub fn show_ad(&mut self) -> Result<(), AirConsoleError> {
        self.session.show_ad()?;
        self.flush();
        Ok(())
    }

    pub fn get_premium(&mut self) {
        self.session.get_premium();
        self.flush();
    }

    pub fn navigate_home(&mut self) {
        self.session.navigate_home();
        self.flush();
    }

    pub fn navigate_to(&mut self, url: &str, parameters: Option<&Value>) -> Result<(), AirConsoleError> {
        self.session.navigate_to(url, parameters)?;
        self.flush();
        Ok(())
    }

    /// Returns `false` if the caller has to open `url` itself.
    pub fn open_external_url(&mut self, url: &str) -> bool {
        let forwarded = self.session.open_external_url(url);
        self.flush();
        forwarded
    }

    pub fn edit_profile(&mut self) {
        self.session.edit_profile();
        self.flush();
    }

    pub fn request_email_address(&mut self) {
        self.session.request_email_address();
        self.flush();
    }

    pub fn request_persistent_data(&mut self, uids: Vec<String>) -> Result<(), AirConsoleError> {
        self.session.request_persistent_data(uids)?;
        self.flush();
        Ok(())
    }

    pub fn store_persistent_data(
        &mut self,
        key: &str,
        value: Value,
        uid: Option<&str>,
    ) -> Result<(), AirConsoleError> {
        self.session.store_persistent_data(key, value, uid)?;
        self.flush();
        Ok(())
    }

    pub fn store_high_score(
        &mut self,
        level_name: &str,
        level_version: &str,
        score: f64,
        uids: &[String],
        data: Option<Value>,
        score_string: Option<&str>,
    ) -> Result<(), AirConsoleError> {
        self.session
            .store_high_score(level_name, level_version, score, uids, data, score_string)?;
        self.flush();
        Ok(())
    }

    pub fn request_high_scores(
        &mut self,
        level_name: &str,
        level_version: &str,
        uids: Option<Vec<String>>,
        ranks: Option<Vec<String>>,
        total: Option<u32>,
        top: Option<u32>,
    ) {
        self.session
            .request_high_scores(level_name, level_version, uids, ranks, total, top);
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airconsole_transport::{ChannelTransport, DetachedTransport};
    use serde_json::json;

    #[derive(Default)]
    struct Counter {
        notifications: usize,
    }

    impl EventHandler for Counter {
        fn on_ready(&mut self, _session: &mut Session, _code: Option<&Value>) {
            self.notifications += 1;
        }

        fn on_pause(&mut self, _session: &mut Session) {
            self.notifications += 1;
        }
    }

    fn decode(bytes: Vec<u8>) -> Value {
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_new_posts_handshake() {
        let (transport, mut outbound) = ChannelTransport::pair();

        let _client = AirConsole::new(transport, Counter::default(), SessionConfig::new("http://g/"));

        let handshake = decode(outbound.try_recv().unwrap());
        assert_eq!(handshake["action"], "ready");
        assert_eq!(handshake["location"], "http://g/");
        assert!(outbound.try_recv().is_err());
    }

    #[test]
    fn test_handle_message_ignores_garbage() {
        let (transport, _outbound) = ChannelTransport::pair();
        let mut client = AirConsole::new(transport, Counter::default(), SessionConfig::default());

        client.handle_message(b"not json");
        client.handle_message(br#"{"action":"teleport"}"#);
        client.handle_message(br#"{"action":"pause"}"#);

        assert_eq!(client.handler().notifications, 1);
    }

    #[test]
    fn test_detached_transport_failures_are_swallowed() {
        let mut client =
            AirConsole::new(DetachedTransport, Counter::default(), SessionConfig::default());

        client.handle_message(br#"{"action":"ready","device_id":0,"devices":[{}]}"#);
        client.broadcast(json!("anyone?"));
        client.navigate_home();

        assert!(client.session().is_ready());
        assert_eq!(client.handler().notifications, 1);
    }

    #[test]
    fn test_screen_only_error_surfaces_as_session_error() {
        let (transport, _outbound) = ChannelTransport::pair();
        let mut client = AirConsole::new(transport, Counter::default(), SessionConfig::default());
        client.handle_message(br#"{"action":"ready","device_id":1,"devices":[{},{}]}"#);

        let result = client.show_ad();

        assert!(matches!(result, Err(AirConsoleError::Session(_))));
    }
}
