//! Transfer request and outcome types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::TransferError;

/// Transaction type - selects the fee schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum TransactionType {
    /// Domestic transfer (fee 2.50)
    #[default]
    #[serde(rename = "DM")]
    Domestic,
    /// Wire transfer (fee 35.00)
    #[serde(rename = "WT")]
    Wire,
    /// International transfer (fee 25.00)
    #[serde(rename = "IT")]
    International,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Domestic => "DM",
            TransactionType::Wire => "WT",
            TransactionType::International => "IT",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal transaction status
///
/// Only terminal states are externally observable; there is no stored
/// "pending" status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Blocked,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Blocked => "blocked",
            TransactionStatus::Rejected => "rejected",
        }
    }

    /// Event type emitted on the event stream for this terminal status
    pub fn event_type(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "transaction.completed",
            TransactionStatus::Blocked => "transaction.blocked",
            TransactionStatus::Rejected => "transaction.rejected",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated-shape transfer request handed to the orchestrator.
///
/// The gateway constructs this from the HTTP payload; format checks
/// (negative amounts, malformed decimals) happen at the Serde layer,
/// business validation in `policy`.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_type: TransactionType,
    /// Client-supplied idempotency key; requests without one are never
    /// deduplicated.
    pub idempotency_key: Option<String>,
}

impl TransferRequest {
    pub fn new(
        from_account: impl Into<String>,
        to_account: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            from_account: from_account.into(),
            to_account: to_account.into(),
            amount,
            currency: "USD".to_string(),
            transaction_type: TransactionType::default(),
            idempotency_key: None,
        }
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Terminal result of one logical transfer request.
///
/// Once produced, an outcome is immutable; replays under the same
/// idempotency key return it verbatim.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    /// Populated for Rejected and Blocked outcomes
    pub reason: Option<TransferError>,
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    pub fee: Decimal,
    /// Per-request score from the risk gate; None when the gate was
    /// unavailable (fail-open) or never consulted.
    pub risk_score: Option<u8>,
    /// Ledger commit sequence; only present for Completed outcomes.
    pub commit_seq: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_type_serde_codes() {
        assert_eq!(serde_json::to_string(&TransactionType::Domestic).unwrap(), r#""DM""#);
        assert_eq!(serde_json::to_string(&TransactionType::Wire).unwrap(), r#""WT""#);
        assert_eq!(
            serde_json::to_string(&TransactionType::International).unwrap(),
            r#""IT""#
        );

        let t: TransactionType = serde_json::from_str(r#""WT""#).unwrap();
        assert_eq!(t, TransactionType::Wire);
    }

    #[test]
    fn test_transaction_type_defaults_to_domestic() {
        assert_eq!(TransactionType::default(), TransactionType::Domestic);
    }

    #[test]
    fn test_status_event_types() {
        assert_eq!(TransactionStatus::Completed.event_type(), "transaction.completed");
        assert_eq!(TransactionStatus::Blocked.event_type(), "transaction.blocked");
        assert_eq!(TransactionStatus::Rejected.event_type(), "transaction.rejected");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Completed).unwrap(),
            r#""completed""#
        );
    }

    #[test]
    fn test_request_builder() {
        let req = TransferRequest::new("1111111111", "2222222222", Decimal::from_str("100.00").unwrap())
            .with_type(TransactionType::Wire)
            .with_idempotency_key("key-1");
        assert_eq!(req.currency, "USD");
        assert_eq!(req.transaction_type, TransactionType::Wire);
        assert_eq!(req.idempotency_key.as_deref(), Some("key-1"));
    }
}
