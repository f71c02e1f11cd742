//! A session's open transport, reachable from both sides.
//!
//! The driver reads events through the slot. A [`Subscription`] can close
//! it from outside the driver task, so cancelling drops the connection
//! before `cancel()` returns rather than whenever the aborted task is next
//! polled.
//!
//! [`Subscription`]: crate::Subscription

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures_util::StreamExt;

use storyfeed_core::{EventStream, Result, StreamEvent};

/// Closes a session's transport without knowing its concrete type.
pub(crate) trait Close: Send + Sync {
    /// Drop the transport now and refuse any later one.
    fn close(&self);
}

pub(crate) struct TransportSlot<T> {
    inner: Mutex<Slot<T>>,
}

struct Slot<T> {
    transport: Option<T>,
    closed: bool,
}

impl<T: EventStream> TransportSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Slot {
                transport: None,
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a freshly opened transport.
    ///
    /// Returns false, dropping `transport`, if the slot was already closed.
    pub(crate) fn put(&self, transport: T) -> bool {
        let mut slot = self.lock();
        if slot.closed {
            drop(slot);
            drop(transport);
            return false;
        }
        slot.transport = Some(transport);
        true
    }

    /// Drop the current transport, leaving the slot usable for a reconnect.
    pub(crate) fn clear(&self) {
        let transport = self.lock().transport.take();
        drop(transport);
    }

    pub(crate) fn is_open(&self) -> bool {
        self.lock().transport.is_some()
    }

    /// Poll the transport for its next event. An empty slot reads as ended.
    ///
    /// The lock is held for the duration of one poll only.
    pub(crate) fn poll_next(&self, cx: &mut Context<'_>) -> Poll<Option<Result<StreamEvent>>> {
        match self.lock().transport.as_mut() {
            Some(transport) => transport.poll_next_unpin(cx),
            None => Poll::Ready(None),
        }
    }
}

impl<T: EventStream> Close for TransportSlot<T> {
    fn close(&self) {
        let transport = {
            let mut slot = self.lock();
            slot.closed = true;
            slot.transport.take()
        };
        drop(transport);
    }
}
