//! Error types for storyfeed.
//!
//! One unified error type with explicit variants, so callers can tell a
//! dropped connection from a server-declared failure or an exhausted
//! reconnect budget.

use std::fmt;
use thiserror::Error;

use crate::types::StoryId;

/// The unified error type for storyfeed operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, dropped stream).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success HTTP responses.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A structured error payload sent by the server on the `error` channel.
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// The reconnect budget ran out.
    #[error("maximum reconnection attempts reached ({attempts})")]
    MaxRetriesExceeded { attempts: u32 },

    /// A one-shot comment fetch failed. Only the caller of that fetch sees this.
    #[error("failed to load comments for story {story_id}: {source}")]
    Enrichment {
        story_id: StoryId,
        #[source]
        source: Box<Error>,
    },

    /// An individual record could not be parsed. Sessions log and drop these.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Wrap an error raised by a comment fetch for `story_id`.
    pub fn enrichment(story_id: StoryId, source: Error) -> Self {
        Error::Enrichment {
            story_id,
            source: Box::new(source),
        }
    }

    /// Returns true for failures of the underlying connection.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established or broke mid-stream.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// The server closed the stream before sending `complete`.
    #[error("stream closed before completion")]
    Closed,

    /// The server signalled failure on the `error` channel without a usable payload.
    #[error("stream reported an error: {message}")]
    Signalled { message: String },
}

/// HTTP status failures.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the response body, if any.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }
}

/// Structured error payload from the `error` event channel.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ServerError {
    /// Server-provided description.
    pub error: String,
    /// Title of the story being processed when the failure happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} (while processing '{}')", self.error, title),
            None => f.write_str(&self.error),
        }
    }
}

impl std::error::Error for ServerError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid story key.
    #[error("invalid story id '{value}': {reason}")]
    StoryId { value: String, reason: String },

    /// Invalid source base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// No story with this id is known to the feed.
    #[error("unknown story '{id}'")]
    UnknownStory { id: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
