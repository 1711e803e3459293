//! Change feed ingress
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/feed/orders | POST | operator |
//!
//! Accepts database webhook payloads and republishes them on the in-process
//! change feed:
//!
//! ```json
//! { "type": "INSERT", "table": "ventas", "record": { ... }, "old_record": null }
//! ```

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/feed/orders", post(handler::ingest))
}
