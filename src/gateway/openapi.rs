//! OpenAPI Documentation
//!
//! Auto-generated OpenAPI 3.0 spec, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::account::AccountType;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{AccountResponse, ErrorBody, TransactionRequest, TransactionResponse};
use crate::transfer::{TransactionStatus, TransactionType};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fundgate Transfer API",
        version = "1.0.0",
        description = "Risk-gated, idempotent funds-transfer engine.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::transaction::create_transaction,
        crate::gateway::handlers::transaction::get_transaction,
        crate::gateway::handlers::account::get_account,
    ),
    components(
        schemas(
            HealthResponse,
            TransactionRequest,
            TransactionResponse,
            AccountResponse,
            ErrorBody,
            TransactionStatus,
            TransactionType,
            AccountType,
        )
    ),
    tags(
        (name = "Transactions", description = "Transfer execution and lookup"),
        (name = "Accounts", description = "Account queries"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
