//! Orders API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use shared::{NewOrder, Order, OrderStatus};

use crate::api::print::{PrintResponse, print_reply};
use crate::auth::{Operator, check_operator};
use crate::core::ServerState;
use crate::orders::{OrderError, PaymentUpdate};
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(rename = "estado_pedido", alias = "status")]
    pub status: OrderStatus,
}

/// POST /api/orders - open an order (prints once through the feed)
pub async fn open(
    State(state): State<ServerState>,
    Json(payload): Json<NewOrder>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders.open(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(&id).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<Order>> {
    if payload.status == OrderStatus::Cancelled {
        check_operator(state.config.api_token.as_deref(), &headers)?;
    }
    Ok(Json(state.orders.update_status(&id, payload.status).await?))
}

/// PATCH /api/orders/{id}/payment
pub async fn update_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentUpdate>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.update_payment(&id, payload).await?))
}

/// POST /api/orders/{id}/reprint - manual re-print of a stored order
pub async fn reprint(
    _: Operator,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<PrintResponse>)> {
    match state.orders.reprint(&id).await {
        Ok(bytes) => Ok(print_reply(Ok(bytes))),
        Err(OrderError::Print(e)) => Ok(print_reply(Err(e))),
        Err(e) => Err(e.into()),
    }
}
