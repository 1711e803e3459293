use comanda_printer::PrintError;
use thiserror::Error;

use super::config::ConfigError;

/// Startup and lifecycle errors (fatal)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Printer configuration error: {0}")]
    Printer(#[from] PrintError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
