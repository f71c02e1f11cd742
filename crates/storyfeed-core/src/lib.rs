//! storyfeed-core - Core types, traits and reconciliation rules.
//!
//! Everything in this crate is transport-agnostic: the story model, the SSE
//! wire codec, the reconnect backoff policy, the record reconciler and the
//! pagination tracker. Backends implement [`StorySource`]; the engine crate
//! drives sessions on top of it.

pub mod backoff;
pub mod error;
pub mod pagination;
pub mod reconcile;
pub mod sse;
pub mod traits;
pub mod types;

pub use backoff::Backoff;
pub use error::Error;
pub use pagination::Pagination;
pub use reconcile::Collection;
pub use traits::{EventStream, PageRequest, StorySource, StreamEvent};
pub use types::{
    BaseUrl, Comment, CommentPage, Overlay, Story, StoryEntry, StoryId, StoryPatch, Toggle,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
