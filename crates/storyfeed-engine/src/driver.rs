//! Per-session driver task.
//!
//! Reads the transport for one session and feeds its events into the
//! [`Session`] state machine strictly one at a time. Dropping the driver,
//! whether it returned or was aborted, closes the transport and releases the
//! feed's active-session marker.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::future::poll_fn;
use tokio::sync::mpsc;
use tracing::{debug, info};

use storyfeed_core::{Result, StorySource};

use crate::session::{Action, Input, Session};
use crate::Snapshot;
use crate::shared::{SessionId, Shared};
use crate::transport::{Close, TransportSlot};

pub(crate) type Outbox = mpsc::UnboundedSender<Result<Snapshot>>;

pub(crate) struct Driver<S: StorySource> {
    id: SessionId,
    source: Arc<S>,
    shared: Arc<Shared>,
    session: Session,
    transport: Arc<TransportSlot<S::Stream>>,
    outbox: Outbox,
}

impl<S: StorySource> Driver<S> {
    pub(crate) fn new(
        id: SessionId,
        source: Arc<S>,
        shared: Arc<Shared>,
        session: Session,
        transport: Arc<TransportSlot<S::Stream>>,
        outbox: Outbox,
    ) -> Self {
        Self {
            id,
            source,
            shared,
            session,
            transport,
            outbox,
        }
    }

    pub(crate) async fn run(mut self) {
        let mut pending: VecDeque<Action> = self.session.handle(Input::Start).into();

        loop {
            while let Some(action) = pending.pop_front() {
                match self.perform(action).await {
                    Step::Continue(more) => pending.extend(more),
                    Step::Stop => return,
                }
            }

            if !self.transport.is_open() {
                debug!(session = self.id, "No transport and nothing to do");
                return;
            }

            let input = match poll_fn(|cx| self.transport.poll_next(cx)).await {
                Some(Ok(event)) => Input::Event(event),
                Some(Err(err)) => Input::TransportFailed(err),
                None => Input::Closed,
            };
            pending.extend(self.session.handle(input));
        }
    }

    async fn perform(&mut self, action: Action) -> Step {
        match action {
            Action::Open(page) => {
                info!(session = self.id, offset = page.offset, limit = page.limit, "Opening stream");
                let input = match self.source.open(page).await {
                    Ok(transport) => {
                        if !self.transport.put(transport) {
                            debug!(session = self.id, "Cancelled while connecting");
                            return Step::Stop;
                        }
                        Input::Opened
                    }
                    Err(err) => Input::OpenFailed(err),
                };
                Step::Continue(self.session.handle(input))
            }
            Action::Merge(story) => self.live(self.shared.merge(self.id, story)),
            Action::SetHasMore(has_more) => {
                self.live(self.shared.set_has_more(self.id, has_more))
            }
            Action::Publish => match self.shared.publish_for(self.id) {
                Some(snapshot) => {
                    // The subscriber may already be gone; the feed still publishes.
                    let _ = self.outbox.send(Ok(snapshot));
                    Step::Continue(Vec::new())
                }
                None => Step::Stop,
            },
            Action::CloseTransport => {
                self.transport.clear();
                Step::Continue(Vec::new())
            }
            Action::Wait(delay) => {
                tokio::time::sleep(delay).await;
                Step::Continue(self.session.handle(Input::RetryDue))
            }
            // The marker is cleared before the caller can observe the outcome.
            Action::Complete => {
                self.shared.release(self.id);
                Step::Stop
            }
            Action::Fail(err) => {
                self.shared.release(self.id);
                let _ = self.outbox.send(Err(err));
                Step::Stop
            }
        }
    }

    fn live(&self, still_current: bool) -> Step {
        if still_current {
            Step::Continue(Vec::new())
        } else {
            debug!(session = self.id, "Session superseded, stopping");
            Step::Stop
        }
    }
}

impl<S: StorySource> Drop for Driver<S> {
    fn drop(&mut self) {
        self.transport.close();
        self.shared.release(self.id);
    }
}

enum Step {
    Continue(Vec<Action>),
    Stop,
}
