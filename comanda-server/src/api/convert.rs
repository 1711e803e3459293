//! Service errors to HTTP errors

use crate::orders::OrderError;
use crate::printing::PrintExecutorError;
use crate::tables::TableError;
use crate::utils::AppError;

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::NotFound(_) => AppError::NotFound(err.to_string()),
            TableError::Conflict { .. } => AppError::Conflict(err.to_string()),
            TableError::Validation(msg) => AppError::Validation(msg),
            TableError::Transfer { step, .. } => AppError::TransferFailed {
                step: step.to_string(),
                message: err.to_string(),
            },
            TableError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<PrintExecutorError> for AppError {
    fn from(err: PrintExecutorError) -> Self {
        match err {
            PrintExecutorError::EmptyOrder(_) => AppError::Validation(err.to_string()),
            PrintExecutorError::Print { .. } => AppError::Printer(err.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(_) => AppError::NotFound(err.to_string()),
            OrderError::Validation(msg) => AppError::Validation(msg),
            OrderError::Table(e) => e.into(),
            OrderError::Print(e) => e.into(),
            OrderError::Database(msg) => AppError::Database(msg),
            OrderError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
