//! Fee & Limit Policy
//!
//! Pure, stateless validation and pricing. Everything here is
//! deterministic given consistent account snapshots; the funds and
//! daily-limit predicates are evaluated by the ledger store inside its
//! pair critical section so concurrent debits cannot jointly pass them.

use rust_decimal::Decimal;

use crate::account::Account;
use crate::money::{cents, is_money_scale};
use crate::transfer::{TransactionType, TransferError, TransferRequest};

/// Smallest accepted transfer amount (0.01)
pub fn min_amount() -> Decimal {
    cents(1)
}

/// Largest accepted transfer amount (1,000,000.00)
pub fn max_amount() -> Decimal {
    Decimal::new(1_000_000, 0)
}

/// Account numbers are exactly 10 ASCII digits.
pub fn account_number_valid(number: &str) -> bool {
    number.len() == 10 && number.bytes().all(|b| b.is_ascii_digit())
}

/// Fee schedule per transaction type.
///
/// A VIP debited account pays no fee regardless of type.
pub fn fee_for(transaction_type: TransactionType, debit_is_vip: bool) -> Decimal {
    if debit_is_vip {
        return Decimal::ZERO;
    }
    match transaction_type {
        TransactionType::Domestic => cents(250),
        TransactionType::International => cents(2_500),
        TransactionType::Wire => cents(3_500),
    }
}

/// Request-shape validation: account formats, self-transfer, amount bounds.
///
/// Rejections here never touch the ledger or the risk gate.
pub fn validate(req: &TransferRequest) -> Result<(), TransferError> {
    if !account_number_valid(&req.from_account) {
        return Err(TransferError::InvalidAccountNumber(req.from_account.clone()));
    }
    if !account_number_valid(&req.to_account) {
        return Err(TransferError::InvalidAccountNumber(req.to_account.clone()));
    }
    if req.from_account == req.to_account {
        return Err(TransferError::SameAccount);
    }
    if !is_money_scale(req.amount) {
        return Err(TransferError::PrecisionOverflow);
    }
    if req.amount < min_amount() {
        return Err(TransferError::AmountTooSmall);
    }
    if req.amount > max_amount() {
        return Err(TransferError::AmountTooLarge);
    }
    Ok(())
}

/// Daily-limit predicate, evaluated against committed `daily_used`.
///
/// Must run under the account's mutation lock: reading `daily_used`
/// outside it would let concurrent debits jointly exceed the limit.
pub fn check_daily_limit(debit: &Account, amount: Decimal) -> Result<(), TransferError> {
    if debit.daily_used + amount > debit.daily_limit {
        return Err(TransferError::DailyLimitExceeded);
    }
    Ok(())
}

/// Funds predicate including overdraft headroom. Same locking rule as
/// [`check_daily_limit`].
pub fn check_funds(debit: &Account, amount: Decimal, fee: Decimal) -> Result<(), TransferError> {
    if debit.balance + debit.overdraft_limit < amount + fee {
        return Err(TransferError::InsufficientFunds);
    }
    Ok(())
}
