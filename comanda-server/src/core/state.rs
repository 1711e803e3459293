use std::sync::Arc;

use comanda_printer::Printer;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::feed::{ChangeFeed, FeedRouter};
use crate::orders::OrderService;
use crate::printing::{KitchenPrintWorker, KitchenTicketRenderer, PrintExecutor};
use crate::tables::TableService;

/// Server state - shared handles to every service
///
/// Cloning is cheap: every field is a handle.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Arc<Config> | configuration (immutable) |
/// | db | DbService | SQLite pool |
/// | feed | ChangeFeed | row change broadcast |
/// | tables | TableService | mesa state machine |
/// | orders | OrderService | order admission and lifecycle |
/// | executor | Arc<PrintExecutor> | renders and sends tickets |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub feed: ChangeFeed,
    pub tables: TableService,
    pub orders: OrderService,
    pub executor: Arc<PrintExecutor>,
}

impl ServerState {
    /// Connect the store and the configured printer
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::connect(&config.database_url).await?;
        let printer = config.printer.connect(config.print_timeout)?;
        tracing::info!(printer = %config.printer, "Printer configured");
        Ok(Self::new(config.clone(), db, printer))
    }

    /// Assemble the state from ready parts
    pub fn new(config: Config, db: DbService, printer: Arc<dyn Printer>) -> Self {
        let feed = ChangeFeed::new(config.feed_buffer);
        let executor = Arc::new(PrintExecutor::new(
            KitchenTicketRenderer::new(config.ticket.clone()),
            printer,
        ));
        let tables = TableService::new(db.clone(), feed.clone());
        let orders = OrderService::new(db.clone(), feed.clone(), tables.clone(), executor.clone());

        Self {
            config: Arc::new(config),
            db,
            feed,
            tables,
            orders,
            executor,
        }
    }

    /// Start the feed router and the kitchen print worker
    ///
    /// The router subscribes before this returns, so every event published
    /// afterwards reaches the worker.
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();

        let (router, orders_rx) = FeedRouter::new(self.config.feed_buffer);
        let source = self.feed.subscribe();
        tasks.spawn(
            "feed_router",
            TaskKind::Listener,
            router.run(source, token.clone()),
        );

        let worker = KitchenPrintWorker::new(self.executor.clone(), self.tables.clone());
        tasks.spawn(
            "kitchen_print_worker",
            TaskKind::Worker,
            worker.run(orders_rx, token),
        );

        tasks.log_summary();
        tasks
    }
}
