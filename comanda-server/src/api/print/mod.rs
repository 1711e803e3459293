//! Print-on-demand API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/print | POST | operator |
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | sent | 200 | `{"success": true, "bytes": 412}` |
//! | empty `items` / bad body | 400 | `{"success": false, "error": "..."}` |
//! | printer failure | 500 | `{"success": false, "error": "Printer 10.0.0.5:9100 failed: ...", "kind": "timeout"}` |

mod handler;

pub use handler::{PrintResponse, print_reply};

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/print", post(handler::print))
}
