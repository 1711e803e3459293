//! Change feed
//!
//! In-process fan-out of row changes. Producers are the store services
//! (tables, orders) and the webhook ingress; the [`FeedRouter`] is the
//! consumer that feeds the kitchen print worker.
//!
//! ```text
//! OrderService ─┐
//! TableService ─┼─► ChangeFeed (broadcast) ──► FeedRouter ── mpsc ──► KitchenPrintWorker
//! webhook ──────┘
//! ```

mod router;

pub use router::FeedRouter;

use shared::ChangeEvent;
use tokio::sync::broadcast;

/// Broadcast handle for row change events
#[derive(Clone, Debug)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event, returning the number of subscribers reached
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let id = event.record_id();
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(record_id = ?id, "No feed subscribers, event discarded");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}
