//! Snapshot fan-out.

use tokio::sync::{broadcast, watch};

use crate::Snapshot;

/// How many snapshots a slow subscriber may fall behind before it lags.
const UPDATE_CAPACITY: usize = 256;

/// Publishes snapshots to any number of subscribers.
///
/// The latest snapshot is always readable synchronously; subscribers also
/// see every snapshot published after they subscribed, in order.
#[derive(Debug)]
pub struct Publisher {
    current: watch::Sender<Snapshot>,
    updates: broadcast::Sender<Snapshot>,
}

impl Publisher {
    pub fn new(initial: Snapshot) -> Self {
        let (current, _) = watch::channel(initial);
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self { current, updates }
    }

    /// Make `snapshot` the current one and send it to subscribers.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.send_replace(snapshot.clone());
        // No receivers is fine.
        let _ = self.updates.send(snapshot);
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Snapshot {
        self.current.borrow().clone()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Receive only the latest snapshot whenever it changes.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.current.subscribe()
    }
}
