//! Kitchen Print Worker
//!
//! Consumes order change events from the [`FeedRouter`](crate::feed::FeedRouter)
//! and prints a kitchen ticket for every newly inserted pending order.
//!
//! | Event | Row status | Action |
//! |-------|------------|--------|
//! | INSERT | pendiente | print once |
//! | INSERT | anything else | skip |
//! | UPDATE / DELETE | any | skip |
//!
//! Events are handled one at a time in arrival order. A failed or panicking
//! cycle is logged and the loop moves on to the next event. The feed delivers
//! at least once, so recently printed order ids are remembered and a
//! redelivered insert is skipped.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono_tz::Tz;
use shared::{ChangeEvent, ChangeKind, ORDERS_TABLE, Order, OrderStatus};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::executor::{PrintExecutor, PrintExecutorError};
use super::shell;
use super::types::KitchenTicket;
use crate::tables::TableService;

/// Arc-wrapped ChangeEvent (from FeedRouter)
pub type ArcChangeEvent = Arc<ChangeEvent>;

/// How many printed order ids are remembered for redelivery checks
pub const RECENT_ORDERS_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Feed payload is not a valid order row: {0}")]
    FeedPayloadInvalid(String),

    #[error(transparent)]
    Print(#[from] PrintExecutorError),
}

/// Result of one dispatch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Printed { order_id: String, bytes: usize },
    /// Insert seen again after its ticket was printed
    AlreadyPrinted { order_id: String },
    Skipped,
}

/// Bounded set of recently printed order ids (oldest evicted first)
#[derive(Debug)]
struct RecentOrders {
    order: VecDeque<String>,
    seen: HashSet<String>,
    capacity: usize,
}

impl RecentOrders {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    fn insert(&mut self, id: String) {
        if !self.seen.insert(id.clone()) {
            return;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
    }
}

/// Decide whether an event should print
///
/// Returns the order snapshot for inserts of pending orders, `None` for every
/// other event.
pub fn select_printable(event: &ChangeEvent) -> Result<Option<Order>, DispatchError> {
    if event.table != ORDERS_TABLE || event.kind != ChangeKind::Insert {
        return Ok(None);
    }
    let order: Order = serde_json::from_value(event.record.clone())
        .map_err(|e| DispatchError::FeedPayloadInvalid(e.to_string()))?;
    if order.status != OrderStatus::Pending {
        return Ok(None);
    }
    Ok(Some(order))
}

/// Build the ticket for a stored order, resolving its table number
///
/// A failed lookup is not fatal: the ticket prints the table id instead.
pub async fn ticket_for_order(order: &Order, tables: &TableService, tz: Tz) -> KitchenTicket {
    let table_number = match order.table_id {
        Some(table_id) => match tables.number_of(table_id).await {
            Ok(number) => Some(number),
            Err(e) => {
                tracing::warn!(order_id = %order.id, table_id, error = %e, "Table number unavailable, printing table id");
                None
            }
        },
        None => None,
    };
    KitchenTicket::from_order(order, table_number, tz)
}

/// Kitchen print worker
pub struct KitchenPrintWorker {
    executor: Arc<PrintExecutor>,
    tables: TableService,
    printed: RecentOrders,
}

impl KitchenPrintWorker {
    pub fn new(executor: Arc<PrintExecutor>, tables: TableService) -> Self {
        Self::with_capacity(executor, tables, RECENT_ORDERS_CAPACITY)
    }

    /// Worker remembering up to `capacity` printed order ids
    pub fn with_capacity(
        executor: Arc<PrintExecutor>,
        tables: TableService,
        capacity: usize,
    ) -> Self {
        Self {
            executor,
            tables,
            printed: RecentOrders::new(capacity),
        }
    }

    /// Run the worker (blocks until the channel closes or shutdown)
    pub async fn run(
        mut self,
        mut event_rx: mpsc::Receiver<ArcChangeEvent>,
        shutdown: CancellationToken,
    ) {
        tracing::info!(
            destination = %self.executor.destination(),
            "Kitchen print worker started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Kitchen print worker received shutdown signal");
                    break;
                }
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        tracing::info!("Feed channel closed, kitchen print worker stopping");
                        break;
                    };
                    let order_id = event.record_id();
                    shell::isolate(order_id.as_deref(), self.handle(&event)).await;
                }
            }
        }
    }

    /// One dispatch cycle with outcome logging
    async fn handle(&mut self, event: &ChangeEvent) {
        let order_id = event.record_id();
        let order_id = order_id.as_deref().unwrap_or(shell::UNKNOWN_ORDER);

        match self.dispatch(event).await {
            Ok(DispatchOutcome::Printed { bytes, .. }) => {
                tracing::info!(order_id, bytes, "Kitchen ticket dispatched");
            }
            Ok(DispatchOutcome::AlreadyPrinted { .. }) => {
                tracing::debug!(order_id, "Redelivered insert, ticket already printed");
            }
            Ok(DispatchOutcome::Skipped) => {
                tracing::debug!(order_id, kind = ?event.kind, "Event does not print");
            }
            Err(e @ DispatchError::FeedPayloadInvalid(_)) => {
                tracing::warn!(order_id, error = %e, "Dropping invalid feed payload");
            }
            Err(e) => {
                tracing::error!(order_id, error = %e, "Kitchen ticket dispatch failed");
            }
        }
    }

    /// Filter, render and send one event
    ///
    /// Only successful prints are remembered, so a redelivery after a failed
    /// send prints.
    pub async fn dispatch(
        &mut self,
        event: &ChangeEvent,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(order) = select_printable(event)? else {
            return Ok(DispatchOutcome::Skipped);
        };
        if self.printed.contains(&order.id) {
            return Ok(DispatchOutcome::AlreadyPrinted { order_id: order.id });
        }

        let ticket = ticket_for_order(&order, &self.tables, self.executor.layout().timezone).await;
        let bytes = self.executor.print_ticket(&ticket).await?;
        self.printed.insert(order.id.clone());
        Ok(DispatchOutcome::Printed {
            order_id: order.id,
            bytes,
        })
    }
}
