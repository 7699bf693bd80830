//! Fan-out of storage change notifications

use crossbeam_channel::{unbounded, Receiver, Sender};
use hl_core::StorageChange;
use parking_lot::Mutex;
use tracing::trace;

/// Set of live subscribers; disconnected receivers are pruned on publish
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<Sender<StorageChange>>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self) -> Receiver<StorageChange> {
        let (tx, rx) = unbounded();
        self.senders.lock().push(tx);
        rx
    }

    pub(crate) fn publish(&self, change: &StorageChange) {
        if change.is_empty() {
            return;
        }
        let mut senders = self.senders.lock();
        senders.retain(|tx| tx.send(change.clone()).is_ok());
        trace!(subscribers = senders.len(), "Published storage change");
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.lock().len()
    }
}
