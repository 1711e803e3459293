use std::fmt;

use serde::Serialize;
use shared::TableState;
use thiserror::Error;

use crate::db::repository::RepoError;

/// Sub-steps of a table transfer, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStep {
    Begin,
    CheckSource,
    CheckTarget,
    MoveOrders,
    FreeSource,
    OccupyTarget,
    Commit,
}

impl TransferStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStep::Begin => "begin",
            TransferStep::CheckSource => "check_source",
            TransferStep::CheckTarget => "check_target",
            TransferStep::MoveOrders => "move_orders",
            TransferStep::FreeSource => "free_source",
            TransferStep::OccupyTarget => "occupy_target",
            TransferStep::Commit => "commit",
        }
    }

    /// Wrap an error as a failure of this step
    pub fn fail(self, source: TableError) -> TableError {
        TableError::Transfer {
            step: self,
            source: Box::new(source),
        }
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table {0} not found")]
    NotFound(i64),

    #[error("Table {table_id} is {actual}, expected {expected}")]
    Conflict {
        table_id: i64,
        expected: TableState,
        actual: TableState,
    },

    #[error("{0}")]
    Validation(String),

    /// Transfer rolled back; nothing was changed
    #[error("Transfer failed at step {step}: {source}")]
    Transfer {
        step: TransferStep,
        #[source]
        source: Box<TableError>,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for TableError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(msg) => TableError::Validation(msg),
            other => TableError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for TableError {
    fn from(err: sqlx::Error) -> Self {
        TableError::Database(err.to_string())
    }
}

pub type TableResult<T> = Result<T, TableError>;
