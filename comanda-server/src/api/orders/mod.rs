//! Orders API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | POST | none |
//! | /api/orders/{id} | GET | none |
//! | /api/orders/{id}/status | PATCH | operator when cancelling |
//! | /api/orders/{id}/payment | PATCH | none |
//! | /api/orders/{id}/reprint | POST | operator |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::open))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/payment", patch(handler::update_payment))
        .route("/{id}/reprint", post(handler::reprint))
}
