//! Feed ingress handler

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use shared::{ChangeEvent, ORDERS_TABLE};

use crate::auth::Operator;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub accepted: bool,
}

/// POST /api/feed/orders
///
/// The row itself is validated by the dispatcher, so a malformed record is
/// accepted here and dropped (with a warning) there.
pub async fn ingest(
    _: Operator,
    State(state): State<ServerState>,
    Json(event): Json<ChangeEvent>,
) -> AppResult<(StatusCode, Json<IngestResponse>)> {
    if event.table != ORDERS_TABLE {
        return Err(AppError::Validation(format!(
            "Only {} events are accepted, got {}",
            ORDERS_TABLE, event.table
        )));
    }
    tracing::info!(kind = ?event.kind, record_id = ?event.record_id(), "Feed event received");
    state.feed.publish(event);
    Ok((StatusCode::ACCEPTED, Json(IngestResponse { accepted: true })))
}
