//! Data models
//!
//! Row types mirrored from the store. Field names follow the store's column
//! names (`mesa_id`, `estado_pedido`, ...); English aliases are accepted on
//! input so API callers may use either.

pub mod dining_table;
pub mod order;

// Re-exports
pub use dining_table::*;
pub use order::*;
