//! API routes
//!
//! - [`health`] - liveness
//! - [`print`] - print-on-demand trigger
//! - [`orders`] - order admission and lifecycle
//! - [`tables`] - mesa state machine
//! - [`feed`] - webhook ingress for an external change feed

pub mod convert;

pub mod feed;
pub mod health;
pub mod orders;
pub mod print;
pub mod tables;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(print::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(feed::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
