//! Dining Table API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/tables | GET, POST | none |
//! | /api/tables/{id} | GET | none |
//! | /api/tables/{id}/occupy | POST | none |
//! | /api/tables/{id}/free | POST | none |
//! | /api/tables/transfer | POST | operator |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/transfer", post(handler::transfer))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/occupy", post(handler::occupy))
        .route("/{id}/free", post(handler::free))
}
