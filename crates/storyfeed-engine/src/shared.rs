//! Feed state shared between the caller-facing API and session drivers.
//!
//! The lock is never held across an await point. Every mutation made on
//! behalf of a session names that session, and is refused once a newer
//! session has taken over or the session was cancelled.

use std::sync::{Mutex, MutexGuard, PoisonError};

use storyfeed_core::{Collection, Comment, PageRequest, Pagination, StoryId, StoryPatch, Toggle};
use tracing::debug;

use crate::{Publisher, Snapshot};

pub(crate) type SessionId = u64;

#[derive(Debug)]
pub(crate) struct FeedState {
    pub(crate) collection: Collection,
    pub(crate) pagination: Pagination,
    pub(crate) active: Option<SessionId>,
    pub(crate) last_page: Option<PageRequest>,
    next_id: SessionId,
}

impl FeedState {
    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.collection, self.pagination)
    }

    /// Mark a new session as the active one.
    pub(crate) fn activate(&mut self, page: PageRequest) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        self.active = Some(id);
        self.last_page = Some(page);
        id
    }
}

#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<FeedState>,
    publisher: Publisher,
}

impl Shared {
    pub(crate) fn new(page_size: u32) -> Self {
        let pagination = Pagination::new(page_size);
        Self {
            state: Mutex::new(FeedState {
                collection: Collection::new(),
                pagination,
                active: None,
                last_page: None,
                next_id: 1,
            }),
            publisher: Publisher::new(Snapshot::empty(pagination)),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Merge a record for `session`. Returns false if the session is stale.
    pub(crate) fn merge(&self, session: SessionId, story: StoryPatch) -> bool {
        let mut state = self.lock();
        if state.active != Some(session) {
            return false;
        }
        let id = story.hn_id.clone();
        let inserted = state.collection.upsert(story);
        debug!(%id, inserted, total = state.collection.len(), "Merged record");
        true
    }

    pub(crate) fn set_has_more(&self, session: SessionId, has_more: bool) -> bool {
        let mut state = self.lock();
        if state.active != Some(session) {
            return false;
        }
        state.pagination.set_has_more(has_more);
        true
    }

    /// Publish the current collection for `session`.
    pub(crate) fn publish_for(&self, session: SessionId) -> Option<Snapshot> {
        let state = self.lock();
        if state.active != Some(session) {
            return None;
        }
        Some(self.publish_locked(&state))
    }

    pub(crate) fn publish_locked(&self, state: &FeedState) -> Snapshot {
        let snapshot = state.snapshot();
        self.publisher.publish(snapshot.clone());
        snapshot
    }

    pub(crate) fn contains(&self, id: &StoryId) -> bool {
        self.lock().collection.get(id).is_some()
    }

    /// Dedup-append comments and publish. `None` if the story is unknown.
    pub(crate) fn append_comments(
        &self,
        id: &StoryId,
        comments: Vec<Comment>,
    ) -> Option<(usize, Snapshot)> {
        let mut state = self.lock();
        let appended = state.collection.append_comments(id, comments)?;
        debug!(%id, appended, "Appended comments");
        Some((appended, self.publish_locked(&state)))
    }

    pub(crate) fn toggle(&self, id: &StoryId, which: Toggle) -> Option<Snapshot> {
        let mut state = self.lock();
        state.collection.toggle(id, which)?;
        Some(self.publish_locked(&state))
    }

    /// Clear the active marker if it still belongs to `session`.
    pub(crate) fn release(&self, session: SessionId) {
        let mut state = self.lock();
        if state.active == Some(session) {
            state.active = None;
            debug!(session, "Session released");
        }
    }
}
