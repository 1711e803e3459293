//! Health check
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "printer": "192.168.1.50:9100", "printer_online": true }
//! ```

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    printer: String,
    /// Printer liveness check; `?check=false` skips it
    #[serde(skip_serializing_if = "Option::is_none")]
    printer_online: Option<bool>,
}

#[derive(Deserialize)]
pub struct HealthQuery {
    #[serde(default = "default_check")]
    check: bool,
}

fn default_check() -> bool {
    true
}

/// GET /health
pub async fn health(
    State(state): State<ServerState>,
    Query(query): Query<HealthQuery>,
) -> Json<HealthResponse> {
    let printer_online = if query.check {
        Some(state.executor.is_online().await)
    } else {
        None
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        printer: state.executor.destination(),
        printer_online,
    })
}
