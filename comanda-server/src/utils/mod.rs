//! Utilities
//!
//! - [`AppError`] - application error type
//! - [`AppResponse`] - API response envelope
//! - logging setup

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult};
