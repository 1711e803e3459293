use thiserror::Error;

use crate::db::repository::RepoError;
use crate::printing::PrintExecutorError;
use crate::tables::TableError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Print(#[from] PrintExecutorError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderError {
    pub fn database(err: sqlx::Error) -> Self {
        OrderError::Database(err.to_string())
    }
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        OrderError::Database(err.to_string())
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
