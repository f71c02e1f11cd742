//! Immutable collection snapshots.

use std::sync::Arc;

use storyfeed_core::{Collection, Pagination, StoryEntry, StoryId};

/// A frozen copy of the collection at one point in time.
///
/// Cloning is cheap; the entries are shared behind an `Arc` and can never
/// be mutated through a snapshot. Presentation code should keep indexes
/// into the last snapshot it received rather than references into the
/// engine.
#[derive(Debug, Clone)]
pub struct Snapshot {
    stories: Arc<[StoryEntry]>,
    pagination: Pagination,
}

impl Snapshot {
    pub(crate) fn capture(collection: &Collection, pagination: Pagination) -> Self {
        Self {
            stories: collection.entries().into(),
            pagination,
        }
    }

    /// An empty snapshot with the given pagination.
    pub fn empty(pagination: Pagination) -> Self {
        Self {
            stories: Arc::from(Vec::new()),
            pagination,
        }
    }

    /// Stories in first-seen order.
    pub fn stories(&self) -> &[StoryEntry] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Pagination state when the snapshot was taken.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    /// Position of a story in this snapshot.
    pub fn position(&self, id: &StoryId) -> Option<usize> {
        self.stories.iter().position(|e| e.id() == id)
    }

    pub fn get(&self, id: &StoryId) -> Option<&StoryEntry> {
        self.position(id).map(|i| &self.stories[i])
    }
}
