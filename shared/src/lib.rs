//! Shared types for the comanda workspace
//!
//! Row models mirrored from the store (orders and dining tables), the
//! change-feed event envelope and a few small utilities.

pub mod feed;
pub mod models;
pub mod serde_helpers;
pub mod util;

// Re-exports
pub use feed::{ChangeEvent, ChangeKind, ORDERS_TABLE, TABLES_TABLE};
pub use models::{
    DiningTable, DiningTableCreate, ItemDetail, ItemDetailField, LineItem, NewOrder, Order,
    OrderStatus, ParseStateError, PaymentStatus, TableState,
};
pub use serde::{Deserialize, Serialize};
