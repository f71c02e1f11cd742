//! Caller-facing subscription to a session.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use storyfeed_core::Result;

use crate::Snapshot;
use crate::shared::{SessionId, Shared};
use crate::transport::Close;

/// A cancellable stream of snapshots for one session.
///
/// Yields one snapshot per accepted record. The stream ends after the
/// session completes; on failure it yields a single `Err` and then ends.
/// Dropping the subscription cancels the session and closes its transport.
pub struct Subscription {
    inner: Pin<Box<dyn Stream<Item = Result<Snapshot>> + Send>>,
    session: Option<SessionHandle>,
}

struct SessionHandle {
    id: SessionId,
    task: AbortHandle,
    transport: Arc<dyn Close>,
    shared: Arc<Shared>,
}

impl Subscription {
    /// A subscription that yields one item and ends without any transport.
    pub(crate) fn immediate(item: Result<Snapshot>) -> Self {
        Self {
            inner: Box::pin(futures_util::stream::once(async move { item })),
            session: None,
        }
    }

    pub(crate) fn attached(
        mut rx: mpsc::UnboundedReceiver<Result<Snapshot>>,
        id: SessionId,
        task: AbortHandle,
        transport: Arc<dyn Close>,
        shared: Arc<Shared>,
    ) -> Self {
        let stream = async_stream::stream! {
            while let Some(item) = rx.recv().await {
                yield item;
            }
        };

        Self {
            inner: Box::pin(stream),
            session: Some(SessionHandle {
                id,
                task,
                transport,
                shared,
            }),
        }
    }

    /// True if this subscription owns a live session rather than a
    /// one-off snapshot.
    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// Cancel the session. Safe to call in any state, any number of times.
    ///
    /// The transport is closed and the feed is free for a new session by the
    /// time this returns.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.session.take() {
            handle.task.abort();
            handle.transport.close();
            handle.shared.release(handle.id);
        }
    }
}

impl Stream for Subscription {
    type Item = Result<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("session", &self.session.as_ref().map(|h| h.id))
            .finish()
    }
}
