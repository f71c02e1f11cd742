//! Core storyfeed types.
//!
//! Keys and URLs are validated at construction time; the story model
//! mirrors the JSON payloads the backend streams.

mod base_url;
mod story;
mod story_id;

pub use base_url::BaseUrl;
pub use story::{Comment, CommentPage, Overlay, Story, StoryEntry, StoryPatch, Toggle};
pub use story_id::StoryId;
