//! Core traits for story sources and their event streams.

mod event_stream;
mod source;

pub use event_stream::{EventStream, StreamEvent};
pub use source::{PageRequest, StorySource};
