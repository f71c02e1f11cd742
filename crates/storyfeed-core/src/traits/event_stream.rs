//! Story event stream trait.

use futures_core::Stream;

use crate::Result;
use crate::sse::SseFrame;

/// One inbound event, classified by SSE channel name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Default channel: one JSON story per event.
    Message(String),
    /// Diagnostic text from the server.
    Log(String),
    /// Failure signal; the payload may be empty.
    Error(Option<String>),
    /// End of the listing, optionally carrying a trailing `has_more`.
    Complete(Option<String>),
    /// Any channel the engine does not know about.
    Other { event: String, data: String },
}

impl From<SseFrame> for StreamEvent {
    fn from(frame: SseFrame) -> Self {
        let payload = (!frame.data.trim().is_empty()).then_some(frame.data);
        match frame.event.as_str() {
            "message" => StreamEvent::Message(payload.unwrap_or_default()),
            "log" => StreamEvent::Log(payload.unwrap_or_default()),
            "error" => StreamEvent::Error(payload),
            "complete" => StreamEvent::Complete(payload),
            _ => StreamEvent::Other {
                event: frame.event,
                data: payload.unwrap_or_default(),
            },
        }
    }
}

/// Stream of events from one open connection.
///
/// An `Err` item or the end of the stream before `Complete` means the
/// transport failed.
pub trait EventStream: Stream<Item = Result<StreamEvent>> + Send + Unpin {}

impl<T> EventStream for T where T: Stream<Item = Result<StreamEvent>> + Send + Unpin {}
