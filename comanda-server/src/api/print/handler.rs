//! Print API Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use comanda_printer::PrintErrorKind;
use serde::Serialize;

use crate::auth::Operator;
use crate::core::ServerState;
use crate::printing::{PrintExecutorError, PrintExecutorResult, PrintRequest};

/// Print endpoint response
#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<PrintErrorKind>,
}

impl PrintResponse {
    fn failed(error: String, kind: Option<PrintErrorKind>) -> Self {
        Self {
            success: false,
            bytes: None,
            error: Some(error),
            kind,
        }
    }
}

/// Map an executor result to the print response
pub fn print_reply(result: PrintExecutorResult<usize>) -> (StatusCode, Json<PrintResponse>) {
    match result {
        Ok(bytes) => (
            StatusCode::OK,
            Json(PrintResponse {
                success: true,
                bytes: Some(bytes),
                error: None,
                kind: None,
            }),
        ),
        Err(e) => {
            let (status, kind) = match &e {
                PrintExecutorError::EmptyOrder(_) => (StatusCode::BAD_REQUEST, None),
                PrintExecutorError::Print { source, .. } => {
                    tracing::error!(error = %e, "Manual print failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, Some(source.kind()))
                }
            };
            (status, Json(PrintResponse::failed(e.to_string(), kind)))
        }
    }
}

/// POST /api/print - print a ticket sent by a client
pub async fn print(
    _: Operator,
    State(state): State<ServerState>,
    payload: Result<Json<PrintRequest>, JsonRejection>,
) -> (StatusCode, Json<PrintResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PrintResponse::failed(rejection.body_text(), None)),
            );
        }
    };
    if request.items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(PrintResponse::failed("items must not be empty".to_string(), None)),
        );
    }

    let ticket = request.into_ticket(state.executor.layout().timezone, Utc::now());
    print_reply(state.executor.print_ticket(&ticket).await)
}
