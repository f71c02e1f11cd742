//! Session state machine.
//!
//! A [`Session`] is one listing request (an offset/limit pair) and its whole
//! lifetime, reconnects included. It performs no I/O: the driver feeds it
//! one [`Input`] at a time and carries out the [`Action`]s it returns, in
//! order.
//!
//! ```text
//! Idle -> Connecting -> Streaming -> Completing
//!            ^              |    \-> Failed
//!            |              v
//!            +------- Reconnecting -> Failed
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, info, trace, warn};

use storyfeed_core::error::{ServerError, TransportError};
use storyfeed_core::{Backoff, Error, PageRequest, StoryPatch, StreamEvent};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Completing,
    Reconnecting,
    Failed,
}

/// Something that happened to the session.
#[derive(Debug)]
pub enum Input {
    /// Begin the session.
    Start,
    /// The transport connected.
    Opened,
    /// The transport could not connect.
    OpenFailed(Error),
    /// An event arrived on the open transport.
    Event(StreamEvent),
    /// The open transport failed.
    TransportFailed(Error),
    /// The transport ended without a completion event.
    Closed,
    /// The backoff delay elapsed.
    RetryDue,
}

/// Something the driver must do.
#[derive(Debug)]
pub enum Action {
    Open(PageRequest),
    Merge(StoryPatch),
    SetHasMore(bool),
    Publish,
    CloseTransport,
    Wait(Duration),
    /// End the session successfully.
    Complete,
    /// End the session with an error for the caller.
    Fail(Error),
}

/// How a transport failure is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    /// Data already flowed; the connection is worth re-establishing.
    Retry,
    /// Nothing ever arrived; the request itself is broken.
    Fatal,
}

#[derive(Deserialize)]
struct CompletePayload {
    #[serde(default)]
    has_more: Option<bool>,
}

/// One listing session.
#[derive(Debug)]
pub struct Session {
    page: PageRequest,
    backoff: Backoff,
    state: SessionState,
    attempt: u32,
    received_any_data: bool,
    terminal: bool,
}

impl Session {
    pub fn new(page: PageRequest, backoff: Backoff) -> Self {
        Self {
            page,
            backoff,
            state: SessionState::Idle,
            attempt: 0,
            received_any_data: false,
            terminal: false,
        }
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Reconnect attempts since the last accepted record.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn received_any_data(&self) -> bool {
        self.received_any_data
    }

    /// True once a completion or unrecoverable error ended the session.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// True while the session holds, or is about to re-open, a transport.
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            SessionState::Connecting | SessionState::Streaming | SessionState::Reconnecting
        )
    }

    /// Apply one input and return the actions it requires.
    pub fn handle(&mut self, input: Input) -> Vec<Action> {
        if self.terminal {
            trace!(?input, "Ignoring input for finished session");
            return Vec::new();
        }

        match input {
            Input::Start => self.on_start(),
            Input::Opened => {
                info!(offset = self.page.offset, limit = self.page.limit, "Stream connected");
                self.state = SessionState::Streaming;
                Vec::new()
            }
            Input::Event(event) => self.on_event(event),
            Input::OpenFailed(err) | Input::TransportFailed(err) => self.on_transport_failure(err),
            Input::Closed => self.on_transport_failure(TransportError::Closed.into()),
            Input::RetryDue => self.on_retry_due(),
        }
    }

    fn on_start(&mut self) -> Vec<Action> {
        if self.state != SessionState::Idle {
            return Vec::new();
        }
        self.state = SessionState::Connecting;
        vec![Action::Open(self.page)]
    }

    fn on_retry_due(&mut self) -> Vec<Action> {
        if self.state != SessionState::Reconnecting {
            return Vec::new();
        }
        info!(attempt = self.attempt, offset = self.page.offset, "Reconnecting");
        self.state = SessionState::Connecting;
        // The server re-streams from the cursor, so resume where the session began.
        vec![Action::Open(self.page)]
    }

    fn on_event(&mut self, event: StreamEvent) -> Vec<Action> {
        match event {
            StreamEvent::Message(data) => self.on_message(&data),
            StreamEvent::Log(text) => {
                debug!(message = %text, "Server log");
                Vec::new()
            }
            StreamEvent::Error(payload) => {
                let err = classify_error_payload(payload);
                error!(error = %err, "Server signalled an error");
                self.finish(SessionState::Failed);
                vec![Action::CloseTransport, Action::Fail(err)]
            }
            StreamEvent::Complete(payload) => {
                let has_more = payload
                    .and_then(|p| serde_json::from_str::<CompletePayload>(&p).ok())
                    .and_then(|p| p.has_more);
                info!(?has_more, "Stream complete");
                self.finish(SessionState::Completing);

                let mut actions = Vec::with_capacity(4);
                if let Some(has_more) = has_more {
                    actions.push(Action::SetHasMore(has_more));
                    actions.push(Action::Publish);
                }
                actions.push(Action::CloseTransport);
                actions.push(Action::Complete);
                actions
            }
            StreamEvent::Other { event, .. } => {
                trace!(event = %event, "Ignoring unknown event");
                Vec::new()
            }
        }
    }

    fn on_message(&mut self, data: &str) -> Vec<Action> {
        let story = match serde_json::from_str::<StoryPatch>(data) {
            Ok(story) => story,
            Err(e) => {
                let err = Error::MalformedRecord {
                    reason: e.to_string(),
                };
                warn!(error = %err, "Dropping record");
                return Vec::new();
            }
        };

        self.received_any_data = true;
        self.attempt = 0;
        debug!(id = %story.hn_id, title = %story.title, "Record received");

        let mut actions = Vec::with_capacity(3);
        let has_more = story.has_more;
        actions.push(Action::Merge(story));
        if let Some(has_more) = has_more {
            actions.push(Action::SetHasMore(has_more));
        }
        actions.push(Action::Publish);
        actions
    }

    fn on_transport_failure(&mut self, err: Error) -> Vec<Action> {
        match self.classify_failure() {
            FailureClass::Fatal => {
                error!(error = %err, "Stream failed before any data arrived");
                self.finish(SessionState::Failed);
                vec![Action::CloseTransport, Action::Fail(err)]
            }
            FailureClass::Retry if self.backoff.exhausted(self.attempt) => {
                error!(error = %err, attempts = self.attempt, "Giving up on reconnects");
                self.finish(SessionState::Failed);
                vec![
                    Action::CloseTransport,
                    Action::Fail(Error::MaxRetriesExceeded {
                        attempts: self.attempt,
                    }),
                ]
            }
            FailureClass::Retry => {
                self.attempt += 1;
                let delay = self
                    .backoff
                    .delay(self.attempt)
                    .unwrap_or_else(|| self.backoff.base());
                warn!(
                    error = %err,
                    attempt = self.attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Connection lost, scheduling reconnect"
                );
                self.state = SessionState::Reconnecting;
                vec![Action::CloseTransport, Action::Wait(delay)]
            }
        }
    }

    fn classify_failure(&self) -> FailureClass {
        if self.received_any_data {
            FailureClass::Retry
        } else {
            FailureClass::Fatal
        }
    }

    fn finish(&mut self, state: SessionState) {
        self.terminal = true;
        self.state = state;
    }
}

fn classify_error_payload(payload: Option<String>) -> Error {
    match payload {
        Some(text) => match serde_json::from_str::<ServerError>(&text) {
            Ok(server) => Error::Server(server),
            Err(_) => TransportError::Signalled { message: text }.into(),
        },
        None => TransportError::Signalled {
            message: "empty error event".to_string(),
        }
        .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(PageRequest::new(0, 10), Backoff::default())
    }

    fn streaming() -> Session {
        let mut s = session();
        s.handle(Input::Start);
        s.handle(Input::Opened);
        s
    }

    fn message(id: u32) -> Input {
        Input::Event(StreamEvent::Message(format!(
            r#"{{"hn_id": "{id}", "title": "story {id}"}}"#
        )))
    }

    fn drop_conn() -> Input {
        Input::TransportFailed(TransportError::Closed.into())
    }

    #[test]
    fn start_opens_requested_page() {
        let mut s = Session::new(PageRequest::new(20, 10), Backoff::default());
        let actions = s.handle(Input::Start);
        assert!(matches!(actions[..], [Action::Open(PageRequest { offset: 20, limit: 10 })]));
        assert_eq!(s.state(), SessionState::Connecting);
        assert!(s.handle(Input::Start).is_empty());
    }

    #[test]
    fn record_merges_then_publishes() {
        let mut s = streaming();
        let actions = s.handle(message(1));
        assert!(matches!(actions[..], [Action::Merge(_), Action::Publish]));
        assert!(s.received_any_data());
    }

    #[test]
    fn inline_has_more_is_forwarded() {
        let mut s = streaming();
        let actions = s.handle(Input::Event(StreamEvent::Message(
            r#"{"hn_id": "1", "title": "t", "has_more": false}"#.into(),
        )));
        assert!(matches!(
            actions[..],
            [Action::Merge(_), Action::SetHasMore(false), Action::Publish]
        ));
    }

    #[test]
    fn malformed_record_is_dropped() {
        let mut s = streaming();
        assert!(s.handle(Input::Event(StreamEvent::Message("{not json".into()))).is_empty());
        assert!(s.handle(Input::Event(StreamEvent::Message(r#"{"hn_id": "1"}"#.into()))).is_empty());
        assert!(
            s.handle(Input::Event(StreamEvent::Message(
                r#"{"hn_id": "1", "title": ""}"#.into()
            )))
            .is_empty()
        );
        assert!(!s.received_any_data());
        assert_eq!(s.state(), SessionState::Streaming);
    }

    #[test]
    fn failure_before_data_is_fatal() {
        let mut s = streaming();
        let actions = s.handle(drop_conn());
        assert!(matches!(
            actions[..],
            [Action::CloseTransport, Action::Fail(Error::Transport(_))]
        ));
        assert!(s.is_terminal());
        assert_eq!(s.state(), SessionState::Failed);
    }

    #[test]
    fn open_failure_before_data_is_fatal() {
        let mut s = session();
        s.handle(Input::Start);
        let actions = s.handle(Input::OpenFailed(
            TransportError::Connection {
                message: "refused".into(),
            }
            .into(),
        ));
        assert!(matches!(actions[..], [Action::CloseTransport, Action::Fail(_)]));
    }

    #[test]
    fn failure_after_data_backs_off_then_reopens_same_offset() {
        let mut s = Session::new(PageRequest::new(30, 10), Backoff::default());
        s.handle(Input::Start);
        s.handle(Input::Opened);
        s.handle(message(1));

        let actions = s.handle(Input::Closed);
        assert!(matches!(
            actions[..],
            [Action::CloseTransport, Action::Wait(d)] if d == Duration::from_millis(1000)
        ));
        assert_eq!(s.state(), SessionState::Reconnecting);
        assert!(s.is_active());

        let actions = s.handle(Input::RetryDue);
        assert!(matches!(actions[..], [Action::Open(PageRequest { offset: 30, .. })]));
    }

    #[test]
    fn backoff_schedule_then_max_retries() {
        let mut s = streaming();
        s.handle(message(1));

        let mut delays = Vec::new();
        for _ in 0..5 {
            match &s.handle(drop_conn())[..] {
                [Action::CloseTransport, Action::Wait(d)] => delays.push(d.as_millis()),
                other => panic!("unexpected actions: {other:?}"),
            }
            s.handle(Input::RetryDue);
            // Connection attempt fails straight away.
        }
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);

        let actions = s.handle(drop_conn());
        assert!(matches!(
            actions[..],
            [Action::CloseTransport, Action::Fail(Error::MaxRetriesExceeded { attempts: 5 })]
        ));
        assert!(s.is_terminal());
    }

    #[test]
    fn record_resets_attempt_counter() {
        let mut s = streaming();
        s.handle(message(1));
        s.handle(drop_conn());
        s.handle(Input::RetryDue);
        s.handle(Input::Opened);
        assert_eq!(s.attempt(), 1);
        s.handle(message(2));
        assert_eq!(s.attempt(), 0);
    }

    #[test]
    fn structured_error_event() {
        let mut s = streaming();
        let actions = s.handle(Input::Event(StreamEvent::Error(Some(
            r#"{"error": "Stream error: boom"}"#.into(),
        ))));
        match &actions[..] {
            [Action::CloseTransport, Action::Fail(Error::Server(e))] => {
                assert_eq!(e.error, "Stream error: boom");
            }
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn unstructured_error_event_is_transport_error() {
        let mut s = streaming();
        let actions = s.handle(Input::Event(StreamEvent::Error(None)));
        assert!(matches!(
            actions[..],
            [Action::CloseTransport, Action::Fail(Error::Transport(_))]
        ));
    }

    #[test]
    fn complete_sets_has_more_and_ends() {
        let mut s = streaming();
        s.handle(message(1));
        let actions = s.handle(Input::Event(StreamEvent::Complete(Some(
            r#"{"has_more": false}"#.into(),
        ))));
        assert!(matches!(
            actions[..],
            [
                Action::SetHasMore(false),
                Action::Publish,
                Action::CloseTransport,
                Action::Complete
            ]
        ));
        assert!(s.is_terminal());
    }

    #[test]
    fn complete_without_payload() {
        let mut s = streaming();
        let actions = s.handle(Input::Event(StreamEvent::Complete(None)));
        assert!(matches!(actions[..], [Action::CloseTransport, Action::Complete]));
    }

    #[test]
    fn terminal_session_ignores_everything() {
        let mut s = streaming();
        s.handle(Input::Event(StreamEvent::Complete(None)));
        assert!(s.handle(Input::Event(StreamEvent::Error(None))).is_empty());
        assert!(s.handle(message(1)).is_empty());
        assert!(s.handle(Input::Closed).is_empty());
    }

    #[test]
    fn log_and_unknown_events_are_ignored() {
        let mut s = streaming();
        assert!(s.handle(Input::Event(StreamEvent::Log("Fetching...".into()))).is_empty());
        assert!(
            s.handle(Input::Event(StreamEvent::Other {
                event: "ping".into(),
                data: String::new()
            }))
            .is_empty()
        );
    }
}
