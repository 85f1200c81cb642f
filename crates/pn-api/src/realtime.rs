//! In-process counter change feed.
//!
//! Handlers publish a fresh `PostCounters` after every successful increment.
//! Whatever pushes updates to browsers subscribes here; slow subscribers
//! lose the oldest updates instead of blocking publishers.

use pn_core::models::PostCounters;
use pn_core::traits::CounterFeed;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct BroadcastCounterFeed {
    tx: broadcast::Sender<PostCounters>,
}

impl BroadcastCounterFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PostCounters> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastCounterFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

impl CounterFeed for BroadcastCounterFeed {
    fn publish(&self, update: PostCounters) {
        // Err only means nobody is listening right now
        if let Ok(receivers) = self.tx.send(update) {
            log::trace!("counters for {} sent to {} subscribers", update.post_id, receivers);
        }
    }
}
