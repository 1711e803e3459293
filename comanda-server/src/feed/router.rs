//! Feed Router
//!
//! Subscribes to the [`ChangeFeed`](super::ChangeFeed) broadcast and forwards
//! order-table events to the print worker, in arrival order.
//!
//! The forward is an awaited send: when the worker is busy printing the
//! router waits instead of dropping, so every insert gets its print attempt.

use shared::{ChangeEvent, ORDERS_TABLE};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Feed router
pub struct FeedRouter {
    orders_tx: mpsc::Sender<Arc<ChangeEvent>>,
}

impl FeedRouter {
    /// Create the router and the receiving end of the orders channel
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Arc<ChangeEvent>>) {
        let (orders_tx, orders_rx) = mpsc::channel(buffer.max(1));
        (Self { orders_tx }, orders_rx)
    }

    /// Run the router (blocks until the source closes or shutdown)
    pub async fn run(
        self,
        mut source: broadcast::Receiver<ChangeEvent>,
        shutdown: CancellationToken,
    ) {
        tracing::info!("Feed router started");

        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Feed router received shutdown signal");
                    break;
                }
                received = source.recv() => received,
            };

            match received {
                Ok(event) => {
                    if !self.forward(event).await {
                        tracing::info!("Orders channel closed, feed router stopping");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::error!(
                        skipped = n,
                        "Feed router lagged! Events skipped - inserted orders may not print"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Feed closed, feed router stopping");
                    break;
                }
            }
        }
    }

    /// Forward one event; returns `false` once the receiver is gone
    async fn forward(&self, event: ChangeEvent) -> bool {
        if event.table != ORDERS_TABLE {
            tracing::trace!(table = %event.table, "Ignoring non-order change");
            return true;
        }
        self.orders_tx.send(Arc::new(event)).await.is_ok()
    }
}
