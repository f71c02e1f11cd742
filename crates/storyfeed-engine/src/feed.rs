//! The caller-facing feed.

use std::sync::{Arc, MutexGuard};

use tokio::sync::{broadcast, mpsc};
use tracing::{Instrument, debug, info, info_span};

use storyfeed_core::error::InvalidInputError;
use storyfeed_core::{Error, PageRequest, Result, StoryId, StorySource, Toggle};

use crate::driver::Driver;
use crate::shared::{FeedState, Shared};
use crate::transport::TransportSlot;
use crate::{FeedConfig, Session, Snapshot, Subscription};

/// Result of a one-shot comment fetch.
#[derive(Debug, Clone)]
pub struct CommentsUpdate {
    /// The collection after the new comments were appended.
    pub snapshot: Snapshot,
    /// How many comments were new.
    pub appended: usize,
    /// Whether the server has further comments.
    pub has_more: bool,
}

/// A continuously-updated, deduplicated story listing.
///
/// The feed exclusively owns its collection. Callers only ever see
/// [`Snapshot`]s, and at most one streaming session is active at a time.
/// Sessions run on the ambient Tokio runtime.
pub struct Feed<S: StorySource> {
    source: Arc<S>,
    shared: Arc<Shared>,
    config: FeedConfig,
}

impl<S: StorySource> Feed<S> {
    pub fn new(source: S, config: FeedConfig) -> Self {
        Self {
            source: Arc::new(source),
            shared: Arc::new(Shared::new(config.page_size)),
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Start streaming the page at `offset`.
    ///
    /// While a session is active this opens nothing and yields the current
    /// snapshot once. Offset 0 starts a fresh listing and clears whatever was
    /// collected before. Once the server has declared there is nothing more,
    /// the subscription completes immediately with the current snapshot.
    pub fn start(&self, offset: u32, limit: u32) -> Subscription {
        let state = self.shared.lock();
        self.begin(state, offset, limit)
    }

    /// Advance to the next page and start streaming it.
    pub fn load_more(&self) -> Subscription {
        let mut state = self.shared.lock();
        if state.active.is_some() || !state.pagination.has_more() {
            return self.settled(&state);
        }
        state.pagination.advance();
        let (offset, limit) = (state.pagination.offset(), state.pagination.limit());
        self.begin(state, offset, limit)
    }

    /// Restart the most recent session's page.
    pub fn retry(&self) -> Subscription {
        let state = self.shared.lock();
        let page = state
            .last_page
            .unwrap_or_else(|| PageRequest::new(0, self.config.page_size));
        self.begin(state, page.offset, page.limit)
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Snapshot {
        self.shared.publisher().current()
    }

    /// Receive every snapshot published from now on, across sessions.
    pub fn watch(&self) -> broadcast::Receiver<Snapshot> {
        self.shared.publisher().subscribe()
    }

    /// True while a session holds or is re-establishing a transport.
    pub fn is_active(&self) -> bool {
        self.shared.lock().active.is_some()
    }

    /// Flip a presentation flag on one story and republish.
    pub fn toggle(&self, id: &StoryId, which: Toggle) -> Result<Snapshot> {
        self.shared.toggle(id, which).ok_or_else(|| unknown(id))
    }

    /// Fetch further comments for a story and append the ones not seen yet.
    ///
    /// Failures are returned to this caller only; any streaming session
    /// carries on untouched.
    pub async fn load_more_comments(&self, id: &StoryId, offset: u32) -> Result<CommentsUpdate> {
        if !self.shared.contains(id) {
            return Err(unknown(id));
        }

        let page = self
            .source
            .fetch_comments(id, offset)
            .await
            .map_err(|e| Error::enrichment(id.clone(), e))?;

        let has_more = page.has_more;
        let (appended, snapshot) = self
            .shared
            .append_comments(id, page.comments)
            .ok_or_else(|| unknown(id))?;

        Ok(CommentsUpdate {
            snapshot,
            appended,
            has_more,
        })
    }

    fn begin(&self, mut state: MutexGuard<'_, FeedState>, offset: u32, limit: u32) -> Subscription {
        if state.active.is_some() {
            debug!(offset, limit, "Session already active, returning current snapshot");
            return self.settled(&state);
        }

        if offset == 0 {
            state.collection.clear();
            state.pagination.reset(limit);
            self.shared.publish_locked(&state);
        }

        if !state.pagination.has_more() {
            info!(offset, "No more stories, nothing to fetch");
            return self.settled(&state);
        }

        let page = PageRequest::new(offset, limit);
        state.pagination.begin(offset, limit);
        let id = state.activate(page);
        drop(state);

        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(page, self.config.backoff());
        let transport = Arc::new(TransportSlot::new());
        let driver = Driver::new(
            id,
            self.source.clone(),
            self.shared.clone(),
            session,
            transport.clone(),
            tx,
        );
        let span = info_span!("session", id, offset, limit);
        let task = tokio::spawn(driver.run().instrument(span));

        Subscription::attached(rx, id, task.abort_handle(), transport, self.shared.clone())
    }

    fn settled(&self, state: &FeedState) -> Subscription {
        Subscription::immediate(Ok(state.snapshot()))
    }
}

fn unknown(id: &StoryId) -> Error {
    InvalidInputError::UnknownStory { id: id.to_string() }.into()
}
