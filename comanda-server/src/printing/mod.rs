//! Kitchen Printing Module
//!
//! - [`types`] - kitchen ticket and print-on-demand request
//! - [`renderer`] - ticket to ESC/POS bytes
//! - [`executor`] - validation and serialized sends
//! - [`worker`] - realtime dispatcher fed by the change feed
//! - [`shell`] - panic isolation for dispatch cycles

pub mod executor;
pub mod renderer;
pub mod shell;
pub mod types;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use executor::{PrintExecutor, PrintExecutorError, PrintExecutorResult};
pub use renderer::{KitchenTicketRenderer, TicketLayout};
pub use types::*;
pub use worker::{
    DispatchError, DispatchOutcome, KitchenPrintWorker, select_printable, ticket_for_order,
};
