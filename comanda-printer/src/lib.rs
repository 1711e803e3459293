//! # comanda-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - ASCII folding for printers without a reliable Latin code page
//! - Network printing (raw TCP, port 9100)
//! - Local spooler printing by printer name
//!
//! Business logic (WHAT to print) stays in application code:
//! - Kitchen ticket rendering → comanda-server
//!
//! ## Example
//!
//! ```ignore
//! use comanda_printer::{EscPosBuilder, FontSize, NetworkPrinter, Printer};
//!
//! // Build ESC/POS content
//! let mut builder = EscPosBuilder::new(48);
//! builder.center();
//! builder.size(FontSize::LARGE);
//! builder.line("COCINA");
//! builder.reset_style();
//! builder.sep_double();
//! builder.line("Mesa: 4");
//! builder.cut();
//!
//! // Send to network printer
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(&builder.build()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;

// Re-exports
pub use encoding::{FALLBACK_CHAR, fold_to_ascii, wrap_text};
pub use error::{PrintError, PrintErrorKind, PrintResult};
pub use escpos::{EscPosBuilder, FontSize, PAPER_WIDTH_80MM};
pub use printer::{
    DEFAULT_PORT, DEFAULT_TIMEOUT, NetworkPrinter, Printer, PrinterDestination, SpoolerPrinter,
};
