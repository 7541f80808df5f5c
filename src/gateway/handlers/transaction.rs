//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::super::state::AppState;
use super::super::types::{ErrorBody, TransactionRequest, TransactionResponse};

/// Execute a transfer
///
/// POST /api/v1/transactions
///
/// Malformed payloads (negative amounts, bad decimal formats) are
/// rejected by the extractor before this handler runs.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transfer completed", body = TransactionResponse),
        (status = 400, description = "Insufficient funds or daily limit exceeded", body = ErrorBody),
        (status = 403, description = "Blocked by fraud detection", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    ),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactionRequest>,
) -> Response {
    let outcome = state.orchestrator.submit(req.into_domain()).await;

    match &outcome.reason {
        None => (StatusCode::OK, Json(TransactionResponse::from_outcome(&outcome))).into_response(),
        Some(error) => {
            let status =
                StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
            (status, Json(ErrorBody::from_error(error))).into_response()
        }
    }
}

/// Look up a past transaction by id
///
/// GET /api/v1/transactions/{transaction_id}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    params(
        ("transaction_id" = Uuid, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Transaction details", body = TransactionResponse),
        (status = 404, description = "Unknown transaction", body = ErrorBody)
    ),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<Uuid>,
) -> Response {
    match state.orchestrator.get(transaction_id) {
        Some(outcome) => {
            (StatusCode::OK, Json(TransactionResponse::from_outcome(&outcome))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(
                format!("transaction not found: {}", transaction_id),
                "TRANSACTION_NOT_FOUND",
            )),
        )
            .into_response(),
    }
}
