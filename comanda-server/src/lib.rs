//! Comanda Server - kitchen ticket printing for the restaurant POS
//!
//! # Overview
//!
//! Orders opened at a table (or for takeout) are printed once on the kitchen
//! printer. Printing is driven by the store's change feed, not by the HTTP
//! request that created the order, so externally pushed rows print too.
//!
//! ```text
//! HTTP / webhook ──▶ OrderService ──▶ ventas row ──▶ ChangeFeed
//!                                                       │
//!                              FeedRouter (ventas only) ▼
//!                                             KitchenPrintWorker
//!                                                       │ INSERT + pendiente
//!                                                       ▼
//!                         KitchenTicketRenderer ──▶ PrintExecutor ──▶ Printer
//! ```
//!
//! # Modules
//!
//! ```text
//! comanda-server/src/
//! ├── core/          # config, state, background tasks, server
//! ├── db/            # SQLite pool + repositories
//! ├── feed/          # change feed + router
//! ├── tables/        # mesa state machine (occupy, free, transfer)
//! ├── orders/        # order lifecycle
//! ├── printing/      # ticket model, renderer, executor, dispatcher
//! ├── auth/          # operator token extractor
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # AppError, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod feed;
pub mod orders;
pub mod printing;
pub mod tables;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use printing::{KitchenPrintWorker, PrintExecutor, TicketLayout};
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and install the global logger
///
/// `LOG_LEVEL` and `LOG_DIR` are read here rather than from [`Config`] so
/// configuration errors are already logged.
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
  ___  ___  _ __ ___   __ _ _ __   __| | __ _
 / __|/ _ \| '_ ` _ \ / _` | '_ \ / _` |/ _` |
| (__| (_) | | | | | | (_| | | | | (_| | (_| |
 \___|\___/|_| |_| |_|\__,_|_| |_|\__,_|\__,_|
    "#
    );
}
