//! Error types for the printer library

use serde::Serialize;
use thiserror::Error;

/// Printer error types
///
/// Every variant means the job was NOT delivered; there is no partial success.
#[derive(Debug, Error)]
pub enum PrintError {
    /// Liveness check or connection failed before any byte was sent
    #[error("Printer unreachable: {0}")]
    Unreachable(String),

    /// Connect or write exceeded the configured bound
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Connected, but the write itself failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl PrintError {
    /// Coarse classification used in logs and API responses
    pub fn kind(&self) -> PrintErrorKind {
        match self {
            PrintError::Unreachable(_) => PrintErrorKind::Unreachable,
            PrintError::Timeout(_) => PrintErrorKind::Timeout,
            PrintError::WriteFailed(_) => PrintErrorKind::WriteError,
            PrintError::InvalidConfig(_) => PrintErrorKind::InvalidConfig,
        }
    }
}

/// Failure kind of a send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintErrorKind {
    Unreachable,
    Timeout,
    WriteError,
    InvalidConfig,
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
