//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shared::{DiningTable, DiningTableCreate};

use crate::auth::Operator;
use crate::core::ServerState;
use crate::tables::{TransferSummary, Transition};
use crate::utils::AppResult;

/// Transition response: the table after the call and whether it changed
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub table: DiningTable,
    pub transition: Transition,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: i64,
    pub to: i64,
}

/// GET /api/tables
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(state.tables.list().await?))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.get(id).await?))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    let table = state.tables.create(payload).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

/// POST /api/tables/{id}/occupy (idempotent)
pub async fn occupy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TransitionResponse>> {
    let transition = state.tables.occupy(id).await?;
    let table = state.tables.get(id).await?;
    Ok(Json(TransitionResponse { table, transition }))
}

/// POST /api/tables/{id}/free (idempotent)
pub async fn free(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TransitionResponse>> {
    let transition = state.tables.free(id).await?;
    let table = state.tables.get(id).await?;
    Ok(Json(TransitionResponse { table, transition }))
}

/// POST /api/tables/transfer - move unpaid orders to a free table
pub async fn transfer(
    _: Operator,
    State(state): State<ServerState>,
    Json(payload): Json<TransferRequest>,
) -> AppResult<Json<TransferSummary>> {
    Ok(Json(state.tables.transfer(payload.from, payload.to).await?))
}
