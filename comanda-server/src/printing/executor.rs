//! Print job executor
//!
//! Validates, renders and sends kitchen tickets. Both the realtime worker and
//! the HTTP handlers go through the same executor, and sends are serialized so
//! two jobs never interleave on the printer.

use std::sync::Arc;

use comanda_printer::{PrintError, Printer};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::renderer::{KitchenTicketRenderer, TicketLayout};
use super::types::KitchenTicket;

#[derive(Debug, Error)]
pub enum PrintExecutorError {
    #[error("Order {0} has no items")]
    EmptyOrder(String),

    #[error("Printer {destination} failed: {source}")]
    Print {
        destination: String,
        #[source]
        source: PrintError,
    },
}

pub type PrintExecutorResult<T> = Result<T, PrintExecutorError>;

/// Print job executor
pub struct PrintExecutor {
    renderer: KitchenTicketRenderer,
    printer: Arc<dyn Printer>,
    /// Held for the whole send of one job
    send_lock: Mutex<()>,
}

impl PrintExecutor {
    pub fn new(renderer: KitchenTicketRenderer, printer: Arc<dyn Printer>) -> Self {
        Self {
            renderer,
            printer,
            send_lock: Mutex::new(()),
        }
    }

    pub fn layout(&self) -> &TicketLayout {
        self.renderer.layout()
    }

    /// Configured printer address, as shown to operators
    pub fn destination(&self) -> String {
        self.printer.destination()
    }

    /// Liveness check of the configured printer
    pub async fn is_online(&self) -> bool {
        self.printer.is_online().await
    }

    /// Validate and render a ticket without sending it
    ///
    /// Degradations are logged here; they never fail the job.
    pub fn render(&self, ticket: &KitchenTicket) -> PrintExecutorResult<Vec<u8>> {
        if ticket.is_empty() {
            return Err(PrintExecutorError::EmptyOrder(ticket.order_id.clone()));
        }
        for degradation in ticket.degradations() {
            warn!(order_id = %ticket.order_id, %degradation, "Ticket encoding degraded");
        }
        Ok(self.renderer.render(ticket))
    }

    /// Render and send a kitchen ticket, returning the number of bytes sent
    #[instrument(skip(self, ticket), fields(order_id = %ticket.order_id, destination = %self.printer.destination()))]
    pub async fn print_ticket(&self, ticket: &KitchenTicket) -> PrintExecutorResult<usize> {
        let data = self.render(ticket)?;

        let _guard = self.send_lock.lock().await;
        self.printer
            .print(&data)
            .await
            .map_err(|source| PrintExecutorError::Print {
                destination: self.printer.destination(),
                source,
            })?;

        info!(bytes = data.len(), "Kitchen ticket printed");
        Ok(data.len())
    }
}
