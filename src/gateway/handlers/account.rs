//! Account handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::state::AppState;
use super::super::types::{AccountResponse, ErrorBody};

/// Get account details
///
/// GET /api/v1/accounts/{account_number}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_number}",
    params(
        ("account_number" = String, Path, description = "10-digit account number")
    ),
    responses(
        (status = 200, description = "Account details", body = AccountResponse),
        (status = 404, description = "Unknown account", body = ErrorBody)
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(account_number): Path<String>,
) -> Response {
    match state.ledger.get(&account_number) {
        Some(account) => {
            (StatusCode::OK, Json(AccountResponse::from_account(&account))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(
                format!("account not found: {}", account_number),
                "ACCOUNT_NOT_FOUND",
            )),
        )
            .into_response(),
    }
}
