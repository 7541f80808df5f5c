//! Data models for accounts

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AccountType {
    #[serde(rename = "C")]
    Checking,
    #[serde(rename = "S")]
    Savings,
    #[serde(rename = "B")]
    Business,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "C",
            AccountType::Savings => "S",
            AccountType::Business => "B",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default per-account daily debit limit (5,000,000.00)
pub fn default_daily_limit() -> Decimal {
    Decimal::new(5_000_000, 0)
}

/// A ledger account.
///
/// Mutations only ever happen inside `LedgerStore::apply_transfer`,
/// under the account's mutex; everything handed out of the store is a
/// snapshot clone.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    /// Balance plus overdraft headroom; what a debit can draw on.
    pub available_balance: Decimal,
    pub overdraft_limit: Decimal,
    pub daily_limit: Decimal,
    /// Sum of debits committed within `daily_window`.
    pub daily_used: Decimal,
    /// UTC date the `daily_used` counter belongs to; rolls over lazily
    /// on the next debit after midnight.
    pub daily_window: NaiveDate,
    pub customer_id: String,
    pub is_vip: bool,
    /// Standing risk score of the account holder. Informational only;
    /// blocking decisions use the per-request score from the risk gate.
    pub risk_score: u8,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub transaction_count: u64,
}

impl Account {
    pub fn new(
        account_number: impl Into<String>,
        account_type: AccountType,
        balance: Decimal,
        customer_id: impl Into<String>,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            account_type,
            balance,
            available_balance: balance,
            overdraft_limit: Decimal::ZERO,
            daily_limit: default_daily_limit(),
            daily_used: Decimal::ZERO,
            daily_window: Utc::now().date_naive(),
            customer_id: customer_id.into(),
            is_vip: false,
            risk_score: 0,
            last_transaction_at: None,
            transaction_count: 0,
        }
    }

    pub fn from_seed(seed: AccountSeed) -> Self {
        let overdraft = seed.overdraft_limit.unwrap_or(Decimal::ZERO);
        Self {
            available_balance: seed.balance + overdraft,
            overdraft_limit: overdraft,
            daily_limit: seed.daily_limit.unwrap_or_else(default_daily_limit),
            is_vip: seed.is_vip,
            risk_score: seed.risk_score,
            ..Self::new(seed.account_number, seed.account_type, seed.balance, seed.customer_id)
        }
    }

    /// Reset the daily debit counter when a new UTC day has started.
    pub fn roll_daily_window(&mut self, today: NaiveDate) {
        if self.daily_window != today {
            self.daily_window = today;
            self.daily_used = Decimal::ZERO;
        }
    }
}

/// One account entry in the seed file loaded at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSeed {
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub customer_id: String,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub risk_score: u8,
    #[serde(default)]
    pub overdraft_limit: Option<Decimal>,
    #[serde(default)]
    pub daily_limit: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_account_defaults() {
        let acct = Account::new("1111111111", AccountType::Checking, dec("10000.00"), "CUST001");
        assert_eq!(acct.available_balance, dec("10000.00"));
        assert_eq!(acct.daily_limit, dec("5000000"));
        assert_eq!(acct.daily_used, Decimal::ZERO);
        assert!(!acct.is_vip);
        assert_eq!(acct.transaction_count, 0);
    }

    #[test]
    fn test_from_seed_overdraft_feeds_available() {
        let seed: AccountSeed = serde_yaml::from_str(
            r#"
            account_number: "3333333333"
            account_type: B
            balance: "100000.00"
            customer_id: BUSINESS001
            overdraft_limit: "100000.00"
            "#,
        )
        .unwrap();
        let acct = Account::from_seed(seed);
        assert_eq!(acct.balance, dec("100000.00"));
        assert_eq!(acct.available_balance, dec("200000.00"));
        assert_eq!(acct.overdraft_limit, dec("100000.00"));
    }

    #[test]
    fn test_seed_defaults() {
        let seed: AccountSeed = serde_yaml::from_str(
            r#"
            account_number: "9999999999"
            account_type: C
            balance: "100.00"
            customer_id: CUST004
            "#,
        )
        .unwrap();
        assert!(!seed.is_vip);
        assert_eq!(seed.risk_score, 0);
        assert!(seed.overdraft_limit.is_none());
        assert!(seed.daily_limit.is_none());
    }

    #[test]
    fn test_daily_window_rollover() {
        let mut acct = Account::new("1111111111", AccountType::Checking, dec("100.00"), "C1");
        acct.daily_used = dec("400.00");
        let today = acct.daily_window;

        acct.roll_daily_window(today);
        assert_eq!(acct.daily_used, dec("400.00"));

        acct.roll_daily_window(today.succ_opt().unwrap());
        assert_eq!(acct.daily_used, Decimal::ZERO);
    }

    #[test]
    fn test_account_type_codes() {
        assert_eq!(serde_json::to_string(&AccountType::Checking).unwrap(), r#""C""#);
        let t: AccountType = serde_json::from_str(r#""B""#).unwrap();
        assert_eq!(t, AccountType::Business);
    }
}
