//! Dining table (mesa) state machine
//!
//! Two states, `libre` and `ocupada`:
//!
//! | Operation | From | To | Already there |
//! |-----------|------|----|---------------|
//! | occupy | libre | ocupada | no-op success |
//! | free | ocupada | libre | no-op success |
//! | transfer(a, b) | a ocupada, b libre | a libre, b ocupada | conflict |
//!
//! Every transition is a single conditional UPDATE, so two concurrent callers
//! can never both perform the same transition. A transfer runs in one
//! transaction and reports the step that failed.

mod error;

pub use error::{TableError, TableResult, TransferStep};

use serde::Serialize;
use shared::{ChangeEvent, DiningTable, DiningTableCreate, ORDERS_TABLE, TableState};
use tracing::instrument;

use crate::db::DbService;
use crate::db::repository::{dining_table, order};
use crate::feed::ChangeFeed;

/// Outcome of an idempotent transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// This call changed the state
    Applied,
    /// The table was already in the target state
    Unchanged,
}

/// Result of a successful transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferSummary {
    pub from: DiningTable,
    pub to: DiningTable,
    /// Ids of the orders re-seated at `to`
    pub moved_orders: Vec<String>,
}

/// Table service
#[derive(Clone, Debug)]
pub struct TableService {
    db: DbService,
    feed: ChangeFeed,
}

impl TableService {
    pub fn new(db: DbService, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    pub async fn list(&self) -> TableResult<Vec<DiningTable>> {
        Ok(dining_table::find_all(&self.db.pool).await?)
    }

    pub async fn get(&self, id: i64) -> TableResult<DiningTable> {
        dining_table::find_by_id(&self.db.pool, id)
            .await?
            .ok_or(TableError::NotFound(id))
    }

    /// Printed table number for a table id
    pub async fn number_of(&self, id: i64) -> TableResult<i64> {
        Ok(self.get(id).await?.number)
    }

    pub async fn create(&self, data: DiningTableCreate) -> TableResult<DiningTable> {
        if data.number <= 0 {
            return Err(TableError::Validation(format!(
                "Table number must be positive, got {}",
                data.number
            )));
        }
        let table = dining_table::create(&self.db.pool, &data).await?;
        tracing::info!(table_id = table.id, number = table.number, "Table created");
        Ok(table)
    }

    /// Mark a table occupied (idempotent)
    #[instrument(skip(self))]
    pub async fn occupy(&self, id: i64) -> TableResult<Transition> {
        self.transition(id, TableState::Free, TableState::Occupied)
            .await
    }

    /// Mark a table free (idempotent)
    #[instrument(skip(self))]
    pub async fn free(&self, id: i64) -> TableResult<Transition> {
        self.transition(id, TableState::Occupied, TableState::Free)
            .await
    }

    async fn transition(&self, id: i64, from: TableState, to: TableState) -> TableResult<Transition> {
        if dining_table::transition(&self.db.pool, id, from, to).await? {
            tracing::info!(table_id = id, state = %to, "Table state changed");
            return Ok(Transition::Applied);
        }
        // Lost the compare-and-swap: either already in `to` or missing
        let table = self.get(id).await?;
        if table.state == to {
            tracing::debug!(table_id = id, state = %to, "Table already in target state");
            Ok(Transition::Unchanged)
        } else {
            Err(TableError::Conflict {
                table_id: id,
                expected: from,
                actual: table.state,
            })
        }
    }

    /// Move all unpaid orders from one table to another
    ///
    /// Requires `from` occupied and `to` free. Either every step commits or
    /// none does; the error names the step that failed.
    #[instrument(skip(self))]
    pub async fn transfer(&self, from: i64, to: i64) -> TableResult<TransferSummary> {
        if from == to {
            return Err(TableError::Validation(
                "Source and target table are the same".to_string(),
            ));
        }

        let mut tx = self
            .db
            .pool
            .begin()
            .await
            .map_err(|e| TransferStep::Begin.fail(e.into()))?;

        // Check preconditions inside the transaction
        let source = require_state(&mut tx, from, TableState::Occupied)
            .await
            .map_err(|e| TransferStep::CheckSource.fail(e))?;
        let target = require_state(&mut tx, to, TableState::Free)
            .await
            .map_err(|e| TransferStep::CheckTarget.fail(e))?;

        let moved_orders: Vec<String> = order::find_unpaid_by_table(&mut *tx, from)
            .await
            .map_err(|e| TransferStep::MoveOrders.fail(e.into()))?
            .into_iter()
            .map(|o| o.id)
            .collect();
        order::move_unpaid(&mut *tx, from, to)
            .await
            .map_err(|e| TransferStep::MoveOrders.fail(e.into()))?;

        cas(&mut tx, &source, TableState::Free)
            .await
            .map_err(|e| TransferStep::FreeSource.fail(e))?;
        cas(&mut tx, &target, TableState::Occupied)
            .await
            .map_err(|e| TransferStep::OccupyTarget.fail(e))?;

        tx.commit()
            .await
            .map_err(|e| TransferStep::Commit.fail(e.into()))?;

        tracing::info!(from, to, moved = moved_orders.len(), "Table transfer committed");

        // Moved rows are updates: they reach the feed but never print
        for id in &moved_orders {
            match order::find_by_id(&self.db.pool, id).await {
                Ok(Some(row)) => match serde_json::to_value(&row) {
                    Ok(record) => {
                        self.feed.publish(ChangeEvent::update(ORDERS_TABLE, record, None));
                    }
                    Err(e) => tracing::warn!(order_id = %id, error = %e, "Moved order not serializable"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(order_id = %id, error = %e, "Moved order not readable after commit"),
            }
        }

        Ok(TransferSummary {
            from: DiningTable {
                state: TableState::Free,
                ..source
            },
            to: DiningTable {
                state: TableState::Occupied,
                ..target
            },
            moved_orders,
        })
    }
}

async fn require_state(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
    expected: TableState,
) -> TableResult<DiningTable> {
    let table = dining_table::find_by_id(&mut **tx, id)
        .await?
        .ok_or(TableError::NotFound(id))?;
    if table.state != expected {
        return Err(TableError::Conflict {
            table_id: id,
            expected,
            actual: table.state,
        });
    }
    Ok(table)
}

async fn cas(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    table: &DiningTable,
    to: TableState,
) -> TableResult<()> {
    if dining_table::transition(&mut **tx, table.id, table.state, to).await? {
        return Ok(());
    }
    let current = dining_table::find_by_id(&mut **tx, table.id)
        .await?
        .ok_or(TableError::NotFound(table.id))?;
    Err(TableError::Conflict {
        table_id: table.id,
        expected: table.state,
        actual: current.state,
    })
}
