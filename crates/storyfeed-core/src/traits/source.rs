//! Story source trait.

use async_trait::async_trait;

use crate::Result;
use crate::types::{CommentPage, StoryId};

use super::EventStream;

/// The page a streaming connection is opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

/// A backend that streams story listings and serves comment pages.
#[async_trait]
pub trait StorySource: Send + Sync + 'static {
    /// Event stream type for this source.
    type Stream: EventStream + 'static;

    /// Open a streaming connection for one page of stories.
    async fn open(&self, page: PageRequest) -> Result<Self::Stream>;

    /// One-shot fetch of further comments for a story.
    async fn fetch_comments(&self, id: &StoryId, offset: u32) -> Result<CommentPage>;
}
