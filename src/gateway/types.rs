//! Gateway request/response DTOs
//!
//! HTTP-facing shapes only. Handlers convert these to and from the
//! orchestrator's domain types; no business logic lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::account::{Account, AccountType};
use crate::money::{to_money, StrictAmount};
use crate::transfer::{TransactionStatus, TransactionType, TransferError, TransferOutcome, TransferRequest};

/// Custom deserializer for non-empty strings
fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("string cannot be empty"));
    }
    Ok(s)
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Transaction creation request (HTTP deserialization)
///
/// Amount format is validated at the Serde layer by `StrictAmount`;
/// business validation (range, precision, accounts) happens in the
/// orchestrator.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// Debited account, 10 digits
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    #[schema(example = "1111111111")]
    pub from_account: String,
    /// Credited account, 10 digits
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    #[schema(example = "2222222222")]
    pub to_account: String,
    /// Transfer amount as string or number
    #[schema(value_type = String, example = "100.00")]
    pub amount: StrictAmount,
    /// ISO currency code
    #[serde(default = "default_currency")]
    #[schema(example = "USD")]
    pub currency: String,
    /// "DM" | "WT" | "IT"; defaults to domestic
    #[serde(default)]
    pub transaction_type: TransactionType,
    /// Client idempotency key; duplicates replay the first outcome
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl TransactionRequest {
    pub fn into_domain(self) -> TransferRequest {
        TransferRequest {
            from_account: self.from_account,
            to_account: self.to_account,
            amount: self.amount.inner(),
            currency: self.currency,
            transaction_type: self.transaction_type,
            idempotency_key: self.idempotency_key,
        }
    }
}

/// Completed transaction response
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    #[schema(example = "completed")]
    pub status: TransactionStatus,
    pub from_account: String,
    pub to_account: String,
    #[schema(value_type = String, example = "100.00")]
    pub amount: String,
    #[schema(value_type = String, example = "2.50")]
    pub fee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransactionResponse {
    pub fn from_outcome(outcome: &TransferOutcome) -> Self {
        Self {
            transaction_id: outcome.transaction_id,
            status: outcome.status,
            from_account: outcome.from_account.clone(),
            to_account: outcome.to_account.clone(),
            amount: to_money(outcome.amount).to_string(),
            fee: to_money(outcome.fee).to_string(),
            risk_score: outcome.risk_score,
            created_at: outcome.created_at,
            completed_at: outcome.completed_at,
        }
    }
}

/// Error body; `detail` carries the human-readable reason.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "insufficient funds to cover amount plus fee")]
    pub detail: String,
    #[schema(example = "INSUFFICIENT_FUNDS")]
    pub code: String,
}

impl ErrorBody {
    pub fn from_error(error: &TransferError) -> Self {
        Self {
            detail: error.to_string(),
            code: error.code().to_string(),
        }
    }

    pub fn new(detail: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: code.into(),
        }
    }
}

/// Account details response
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = "1111111111")]
    pub account_number: String,
    pub account_type: AccountType,
    #[schema(value_type = String, example = "10000.00")]
    pub balance: String,
    #[schema(value_type = String, example = "10000.00")]
    pub available_balance: String,
    #[schema(value_type = String, example = "5000000.00")]
    pub daily_limit: String,
    #[schema(value_type = String, example = "0.00")]
    pub daily_used: String,
    pub customer_id: String,
    pub is_vip: bool,
    pub transaction_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transaction_at: Option<DateTime<Utc>>,
}

impl AccountResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            account_type: account.account_type,
            balance: to_money(account.balance).to_string(),
            available_balance: to_money(account.available_balance).to_string(),
            daily_limit: to_money(account.daily_limit).to_string(),
            daily_used: to_money(account.daily_used).to_string(),
            customer_id: account.customer_id.clone(),
            is_vip: account.is_vip,
            transaction_count: account.transaction_count,
            last_transaction_at: account.last_transaction_at,
        }
    }
}
