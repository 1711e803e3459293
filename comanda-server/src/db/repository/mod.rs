//! Repository Module
//!
//! Plain query functions over the SQLite store. Functions that may run inside
//! a transaction are generic over the executor, so they take either the pool
//! or `&mut *tx`.

pub mod dining_table;
pub mod order;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row exists but a column holds a value the model cannot represent
    #[error("Corrupt row: {0}")]
    Decode(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
