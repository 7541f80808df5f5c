//! Transfer Error Types
//!
//! One taxonomy for everything a transfer can fail with. Validation errors
//! map to 422, policy violations (funds, daily limit) to 400, risk blocks
//! to 403. Dependency degradation never appears here: the risk gate
//! fails open and publish failures are logged, not surfaced.

use thiserror::Error;

/// Transfer error taxonomy
///
/// Error codes are stable and machine-checkable; `Display` messages carry
/// the phrases callers grep for ("insufficient funds", "daily limit",
/// "fraud").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Validation Errors (422) ===
    #[error("invalid account number: {0} (must be exactly 10 digits)")]
    InvalidAccountNumber(String),

    #[error("source and destination account cannot be the same")]
    SameAccount,

    #[error("amount is below the 0.01 minimum")]
    AmountTooSmall,

    #[error("amount exceeds the 1000000.00 maximum")]
    AmountTooLarge,

    #[error("amount carries sub-cent precision")]
    PrecisionOverflow,

    #[error("account not found: {0}")]
    AccountNotFound(String),

    // === Policy Violations (400) ===
    #[error("insufficient funds to cover amount plus fee")]
    InsufficientFunds,

    #[error("daily limit exceeded for source account")]
    DailyLimitExceeded,

    // === Risk (403) ===
    #[error("transaction blocked by fraud detection (risk score {score})")]
    RiskBlocked { score: u8 },
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAccountNumber(_) => "INVALID_ACCOUNT_NUMBER",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::AmountTooSmall => "AMOUNT_TOO_SMALL",
            TransferError::AmountTooLarge => "AMOUNT_TOO_LARGE",
            TransferError::PrecisionOverflow => "PRECISION_OVERFLOW",
            TransferError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            TransferError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            TransferError::DailyLimitExceeded => "DAILY_LIMIT_EXCEEDED",
            TransferError::RiskBlocked { .. } => "RISK_BLOCKED",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidAccountNumber(_)
            | TransferError::SameAccount
            | TransferError::AmountTooSmall
            | TransferError::AmountTooLarge
            | TransferError::PrecisionOverflow
            | TransferError::AccountNotFound(_) => 422,
            TransferError::InsufficientFunds | TransferError::DailyLimitExceeded => 400,
            TransferError::RiskBlocked { .. } => 403,
        }
    }

    /// True for malformed-input failures (as opposed to funds/risk policy)
    pub fn is_validation(&self) -> bool {
        self.http_status() == 422
    }
}
