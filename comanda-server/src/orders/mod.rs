//! Orders (ventas)
//!
//! Admission and lifecycle of orders. Every write publishes a change event
//! with the full row, which is what drives kitchen printing:
//!
//! - `open` inserts a `pendiente` row → INSERT event → one ticket
//! - `update_status` / `update_payment` → UPDATE events → never print
//! - `reprint` is the operator's manual retry, straight to the executor

mod error;

pub use error::{OrderError, OrderResult};

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use serde::Deserialize;
use shared::util::new_order_id;
use shared::{
    ChangeEvent, NewOrder, ORDERS_TABLE, Order, OrderStatus, PaymentStatus, TableState,
};
use tracing::instrument;

use crate::db::DbService;
use crate::db::repository::{dining_table, order};
use crate::feed::ChangeFeed;
use crate::printing::{PrintExecutor, ticket_for_order};
use crate::tables::{TableError, TableService, Transition};

/// Body of `PATCH /api/orders/{id}/payment`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentUpdate {
    #[serde(rename = "estado_pago", alias = "status")]
    pub status: PaymentStatus,
    #[serde(rename = "metodo_pago", alias = "method", default)]
    pub method: Option<String>,
}

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: DbService,
    feed: ChangeFeed,
    tables: TableService,
    executor: Arc<PrintExecutor>,
}

impl OrderService {
    pub fn new(
        db: DbService,
        feed: ChangeFeed,
        tables: TableService,
        executor: Arc<PrintExecutor>,
    ) -> Self {
        Self {
            db,
            feed,
            tables,
            executor,
        }
    }

    pub async fn get(&self, id: &str) -> OrderResult<Order> {
        order::find_by_id(&self.db.pool, id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Open a new order
    ///
    /// Seats the order at its table first (occupying it if free), then inserts
    /// it as `pendiente`. A table occupied by this call is freed again when the
    /// insert fails and no other unpaid order sits there.
    #[instrument(skip(self, new), fields(table_id = ?new.table_id, items = new.items.len()))]
    pub async fn open(&self, new: NewOrder) -> OrderResult<Order> {
        if new.items.is_empty() {
            return Err(OrderError::Validation(
                "Order must have at least one item".to_string(),
            ));
        }
        if !new.total.is_finite() || new.total < 0.0 {
            return Err(OrderError::Validation(format!(
                "Invalid total: {}",
                new.total
            )));
        }

        let seated = match new.table_id {
            Some(table_id) => self.tables.occupy(table_id).await? == Transition::Applied,
            None => false,
        };

        let order = Order {
            id: new_order_id(),
            created_at: Utc::now().trunc_subsecs(3),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            table_id: new.table_id,
            items: new.items,
            notes: new.notes,
            payment_method: new.payment_method,
            total: new.total,
        };

        if let Err(e) = self.store(&order).await {
            if let (true, Some(table_id)) = (seated, order.table_id) {
                self.release_seat(table_id, &e).await;
            }
            return Err(e);
        }

        tracing::info!(order_id = %order.id, "Order opened");
        self.publish(ChangeEvent::insert(ORDERS_TABLE, self.to_record(&order)?));
        Ok(order)
    }

    async fn store(&self, order: &Order) -> OrderResult<()> {
        // The table may be freed between occupy and insert; check again in the transaction
        let mut tx = self.db.pool.begin().await.map_err(OrderError::database)?;
        if let Some(table_id) = order.table_id {
            let table = dining_table::find_by_id(&mut *tx, table_id)
                .await?
                .ok_or(TableError::NotFound(table_id))?;
            if table.state != TableState::Occupied {
                return Err(TableError::Conflict {
                    table_id,
                    expected: TableState::Occupied,
                    actual: table.state,
                }
                .into());
            }
        }
        order::insert(&mut *tx, order).await?;
        tx.commit().await.map_err(OrderError::database)?;
        Ok(())
    }

    /// Undo the occupy of a failed `open` unless another order now sits there
    async fn release_seat(&self, table_id: i64, error: &OrderError) {
        match dining_table::release_if_unused(&self.db.pool, table_id).await {
            Ok(true) => tracing::warn!(table_id, error = %error, "Order not stored, table released"),
            Ok(false) => {
                tracing::warn!(table_id, error = %error, "Order not stored, table left occupied")
            }
            Err(e) => tracing::warn!(
                table_id,
                error = %error,
                release_error = %e,
                "Order not stored and table still occupied"
            ),
        }
    }

    /// Change the kitchen status of an order
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> OrderResult<Order> {
        let old = self.get(id).await?;
        if !order::update_status(&self.db.pool, id, status).await? {
            return Err(OrderError::NotFound(id.to_string()));
        }
        self.publish_update(old).await
    }

    /// Record payment status and method
    #[instrument(skip(self, update), fields(status = %update.status.as_str()))]
    pub async fn update_payment(&self, id: &str, update: PaymentUpdate) -> OrderResult<Order> {
        let old = self.get(id).await?;
        let method = update.method.as_deref().filter(|m| !m.trim().is_empty());
        if !order::update_payment(&self.db.pool, id, update.status, method).await? {
            return Err(OrderError::NotFound(id.to_string()));
        }
        self.publish_update(old).await
    }

    /// Print a stored order again, returning the bytes sent
    #[instrument(skip(self))]
    pub async fn reprint(&self, id: &str) -> OrderResult<usize> {
        let order = self.get(id).await?;
        let ticket = ticket_for_order(&order, &self.tables, self.executor.layout().timezone).await;
        Ok(self.executor.print_ticket(&ticket).await?)
    }

    async fn publish_update(&self, old: Order) -> OrderResult<Order> {
        let current = self.get(&old.id).await?;
        let event = ChangeEvent::update(
            ORDERS_TABLE,
            self.to_record(&current)?,
            Some(self.to_record(&old)?),
        );
        self.publish(event);
        Ok(current)
    }

    fn to_record(&self, order: &Order) -> OrderResult<serde_json::Value> {
        serde_json::to_value(order).map_err(|e| OrderError::Internal(e.to_string()))
    }

    fn publish(&self, event: ChangeEvent) {
        let receivers = self.feed.publish(event);
        tracing::debug!(receivers, "Order change published");
    }
}

#[cfg(test)]
mod tests;
