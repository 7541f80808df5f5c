//! Concurrent ledger store
//!
//! Accounts live in a `DashMap` of individually locked records. A
//! transfer locks both accounts (lexicographic order by account number,
//! so concurrent opposite-direction pairs cannot deadlock), re-checks
//! funds and the daily limit against committed state, and applies both
//! legs in one critical section. The completed event is published before
//! the locks are released, which makes per-account event order equal to
//! commit order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::events::{EventSink, TransactionEvent};
use crate::policy;
use crate::transfer::{TransactionStatus, TransferError};

use super::models::Account;

/// Inputs for one ledger mutation, already validated and risk-cleared.
#[derive(Debug, Clone)]
pub struct TransferApply {
    pub transaction_id: Uuid,
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub risk_score: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a committed transfer.
#[derive(Debug, Clone)]
pub struct AppliedTransfer {
    pub commit_seq: u64,
    pub from: Account,
    pub to: Account,
    pub completed_at: DateTime<Utc>,
}

/// In-memory account ledger.
pub struct LedgerStore {
    accounts: DashMap<String, Arc<Mutex<Account>>>,
    commit_seq: AtomicU64,
    events: Arc<dyn EventSink>,
}

impl LedgerStore {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            accounts: DashMap::new(),
            commit_seq: AtomicU64::new(0),
            events,
        }
    }

    /// Insert or replace an account record.
    pub fn insert(&self, account: Account) {
        debug!(
            account = %account.account_number,
            balance = %account.balance,
            "seeding account"
        );
        self.accounts.insert(
            account.account_number.clone(),
            Arc::new(Mutex::new(account)),
        );
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Point-in-time snapshot of one account.
    pub fn get(&self, account_number: &str) -> Option<Account> {
        let entry = self.accounts.get(account_number)?;
        let arc = Arc::clone(entry.value());
        drop(entry);
        let guard = arc.lock().unwrap();
        Some(guard.clone())
    }

    /// Highest commit sequence issued so far (0 before any commit).
    pub fn last_commit_seq(&self) -> u64 {
        self.commit_seq.load(Ordering::SeqCst)
    }

    /// Apply both legs of a transfer atomically.
    ///
    /// Funds and daily-limit checks run here, under both locks, against
    /// committed balances. On any error the ledger is untouched.
    pub fn apply_transfer(&self, apply: &TransferApply) -> Result<AppliedTransfer, TransferError> {
        let from_arc = self.lookup(&apply.from_account)?;
        let to_arc = self.lookup(&apply.to_account)?;

        // Lock order is by account number, not by debit/credit role.
        let (mut from, mut to) = if apply.from_account < apply.to_account {
            let f = from_arc.lock().unwrap();
            let t = to_arc.lock().unwrap();
            (f, t)
        } else {
            let t = to_arc.lock().unwrap();
            let f = from_arc.lock().unwrap();
            (f, t)
        };

        let completed_at = Utc::now();
        from.roll_daily_window(completed_at.date_naive());

        policy::check_daily_limit(&from, apply.amount)?;
        policy::check_funds(&from, apply.amount, apply.fee)?;

        let debit_total = apply.amount + apply.fee;
        from.balance -= debit_total;
        from.available_balance -= debit_total;
        from.daily_used += apply.amount;
        from.last_transaction_at = Some(completed_at);
        from.transaction_count += 1;

        to.balance += apply.amount;
        to.available_balance += apply.amount;
        to.last_transaction_at = Some(completed_at);
        to.transaction_count += 1;

        let commit_seq = self.commit_seq.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            transaction_id = %apply.transaction_id,
            commit_seq,
            from = %apply.from_account,
            to = %apply.to_account,
            amount = %apply.amount,
            fee = %apply.fee,
            "transfer committed"
        );

        // Published under both locks so each account observes events in
        // its own commit order.
        self.events.publish(TransactionEvent {
            event_type: TransactionStatus::Completed.event_type(),
            transaction_id: apply.transaction_id,
            status: TransactionStatus::Completed,
            from_account: apply.from_account.clone(),
            to_account: apply.to_account.clone(),
            amount: apply.amount,
            fee: apply.fee,
            risk_score: apply.risk_score,
            commit_seq: Some(commit_seq),
            created_at: apply.created_at,
            completed_at: Some(completed_at),
        });

        Ok(AppliedTransfer {
            commit_seq,
            from: from.clone(),
            to: to.clone(),
            completed_at,
        })
    }

    fn lookup(&self, account_number: &str) -> Result<Arc<Mutex<Account>>, TransferError> {
        self.accounts
            .get(account_number)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TransferError::AccountNotFound(account_number.to_string()))
    }

    /// Mutate one account in place. Test-side helper.
    #[cfg(test)]
    pub(crate) fn with_account_mut(&self, account_number: &str, f: impl FnOnce(&mut Account)) {
        let arc = self.lookup(account_number).unwrap();
        let mut guard = arc.lock().unwrap();
        f(&mut guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::AccountType;
    use crate::events::{channel, NullSink};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn seeded_store(events: Arc<dyn EventSink>) -> LedgerStore {
        let store = LedgerStore::new(events);
        store.insert(Account::new(
            "1111111111",
            AccountType::Checking,
            dec("10000.00"),
            "CUST001",
        ));
        let mut savings = Account::new("2222222222", AccountType::Savings, dec("50000.00"), "CUST002");
        savings.is_vip = true;
        store.insert(savings);
        store
    }

    fn apply(amount: &str, fee: &str) -> TransferApply {
        TransferApply {
            transaction_id: Uuid::new_v4(),
            from_account: "1111111111".to_string(),
            to_account: "2222222222".to_string(),
            amount: dec(amount),
            fee: dec(fee),
            risk_score: Some(10),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_moves_amount_and_burns_fee() {
        let store = seeded_store(Arc::new(NullSink));
        let applied = store.apply_transfer(&apply("100.00", "2.50")).unwrap();

        assert_eq!(applied.commit_seq, 1);
        assert_eq!(applied.from.balance, dec("9897.50"));
        assert_eq!(applied.to.balance, dec("50100.00"));
        assert_eq!(applied.from.daily_used, dec("100.00"));
        assert_eq!(applied.from.transaction_count, 1);
        assert_eq!(applied.to.transaction_count, 1);

        // Store state matches the returned snapshots
        assert_eq!(store.get("1111111111").unwrap().balance, dec("9897.50"));
        assert_eq!(store.get("2222222222").unwrap().balance, dec("50100.00"));
    }

    #[test]
    fn test_commit_seq_increments() {
        let store = seeded_store(Arc::new(NullSink));
        assert_eq!(store.last_commit_seq(), 0);
        let a = store.apply_transfer(&apply("10.00", "2.50")).unwrap();
        let b = store.apply_transfer(&apply("10.00", "2.50")).unwrap();
        assert_eq!(a.commit_seq, 1);
        assert_eq!(b.commit_seq, 2);
        assert_eq!(store.last_commit_seq(), 2);
    }

    #[test]
    fn test_insufficient_funds_leaves_ledger_untouched() {
        let store = seeded_store(Arc::new(NullSink));
        let err = store.apply_transfer(&apply("9999.00", "2.50")).unwrap_err();
        assert_eq!(err, TransferError::InsufficientFunds);

        assert_eq!(store.get("1111111111").unwrap().balance, dec("10000.00"));
        assert_eq!(store.get("2222222222").unwrap().balance, dec("50000.00"));
        assert_eq!(store.get("1111111111").unwrap().daily_used, Decimal::ZERO);
        assert_eq!(store.last_commit_seq(), 0);
    }

    #[test]
    fn test_daily_limit_checked_against_committed_usage() {
        let store = seeded_store(Arc::new(NullSink));
        store.with_account_mut("1111111111", |acct| acct.daily_limit = dec("150.00"));

        assert!(store.apply_transfer(&apply("100.00", "2.50")).is_ok());
        let err = store.apply_transfer(&apply("100.00", "2.50")).unwrap_err();
        assert_eq!(err, TransferError::DailyLimitExceeded);

        // Only the first debit landed
        assert_eq!(store.get("1111111111").unwrap().balance, dec("9897.50"));
    }

    #[test]
    fn test_unknown_account_rejected() {
        let store = seeded_store(Arc::new(NullSink));
        let mut bad = apply("10.00", "2.50");
        bad.to_account = "4040404040".to_string();
        let err = store.apply_transfer(&bad).unwrap_err();
        assert_eq!(err, TransferError::AccountNotFound("4040404040".to_string()));
    }

    #[tokio::test]
    async fn test_completed_event_published_with_commit_seq() {
        let (publisher, mut rx) = channel();
        let store = seeded_store(Arc::new(publisher));

        let applied = store.apply_transfer(&apply("100.00", "2.50")).unwrap();
        let event = rx.recv().await.unwrap();

        assert_eq!(event.event_type, "transaction.completed");
        assert_eq!(event.commit_seq, Some(applied.commit_seq));
        assert_eq!(event.amount, dec("100.00"));
        assert_eq!(event.fee, dec("2.50"));
        assert_eq!(event.from_account, "1111111111");
    }

    #[test]
    fn test_failed_apply_publishes_nothing() {
        let (publisher, mut rx) = channel();
        let store = seeded_store(Arc::new(publisher));

        store.apply_transfer(&apply("99999.00", "2.50")).unwrap_err();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_debits_never_overspend() {
        let store = Arc::new(seeded_store(Arc::new(NullSink)));
        store.with_account_mut("1111111111", |acct| {
            acct.balance = dec("1000.00");
            acct.available_balance = dec("1000.00");
        });

        // 20 threads race to debit 100.00 + 2.50; only 9 fit.
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.apply_transfer(&apply("100.00", "2.50")).is_ok())
            })
            .collect();
        let succeeded = handles.into_iter().map(|h| h.join().unwrap()).filter(|&ok| ok).count();

        assert_eq!(succeeded, 9);
        let debit = store.get("1111111111").unwrap();
        assert_eq!(debit.balance, dec("1000.00") - dec("102.50") * Decimal::from(9));
        assert_eq!(debit.daily_used, dec("900.00"));
        assert_eq!(store.get("2222222222").unwrap().balance, dec("50900.00"));
        assert_eq!(store.last_commit_seq(), 9);
    }

    #[test]
    fn test_opposite_direction_transfers_do_not_deadlock() {
        let store = Arc::new(seeded_store(Arc::new(NullSink)));

        let forward = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    store.apply_transfer(&apply("1.00", "0.00")).unwrap();
                }
            })
        };
        let backward = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let mut rev = apply("1.00", "0.00");
                    std::mem::swap(&mut rev.from_account, &mut rev.to_account);
                    store.apply_transfer(&rev).unwrap();
                }
            })
        };
        forward.join().unwrap();
        backward.join().unwrap();

        // Equal flows in both directions cancel out
        assert_eq!(store.get("1111111111").unwrap().balance, dec("10000.00"));
        assert_eq!(store.get("2222222222").unwrap().balance, dec("50000.00"));
        assert_eq!(store.last_commit_seq(), 400);
    }
}
