//! Operator authentication
//!
//! Endpoints that print, cancel or move orders between tables require the
//! shared operator token (`API_TOKEN`) as `Authorization: Bearer <token>`.
//! Without a configured token they are open.
//!
//! | Situation | Status |
//! |-----------|--------|
//! | no token configured | pass |
//! | header missing | 401 Unauthorized |
//! | wrong scheme or token | 401 InvalidToken |

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::core::ServerState;
use crate::utils::AppError;

/// Extractor: the request carries the operator token
///
/// ```ignore
/// pub async fn transfer(_: Operator, State(state): State<ServerState>, ...) -> AppResult<...>
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Operator;

impl FromRequestParts<ServerState> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        check_operator(state.config.api_token.as_deref(), &parts.headers)?;
        Ok(Operator)
    }
}

/// Check the operator token in request headers
pub fn check_operator(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?;

    match header.strip_prefix("Bearer ") {
        Some(token) if constant_time_eq(token.trim().as_bytes(), expected.as_bytes()) => Ok(()),
        _ => {
            tracing::warn!(target: "security", "Rejected operator token");
            Err(AppError::InvalidToken)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
