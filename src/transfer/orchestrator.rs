//! Transfer orchestrator
//!
//! Single entry point for executing transfers. Owns the pipeline order
//! (idempotency, validation, risk, apply) and the risk-block threshold;
//! balance arithmetic lives in the ledger store, pricing in `policy`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use crate::account::{LedgerStore, TransferApply};
use crate::events::{EventSink, TransactionEvent};
use crate::idempotency::{Claim, IdempotencyCache};
use crate::policy;
use crate::risk::{RiskGateClient, RiskRequest};

use super::error::TransferError;
use super::state::TransferPhase;
use super::types::{TransactionStatus, TransferOutcome, TransferRequest};

/// Risk scores strictly above this block the transfer.
pub const RISK_BLOCK_THRESHOLD: u8 = 60;

/// Drives transfers to a terminal outcome.
pub struct TransferOrchestrator {
    ledger: Arc<LedgerStore>,
    risk: RiskGateClient,
    idempotency: Arc<IdempotencyCache>,
    events: Arc<dyn EventSink>,
    records: DashMap<Uuid, TransferOutcome>,
}

impl TransferOrchestrator {
    pub fn new(
        ledger: Arc<LedgerStore>,
        risk: RiskGateClient,
        idempotency: Arc<IdempotencyCache>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            ledger,
            risk,
            idempotency,
            events,
            records: DashMap::new(),
        }
    }

    /// Execute one transfer request.
    ///
    /// Requests carrying an idempotency key are deduplicated: the first
    /// caller executes, concurrent duplicates wait for its outcome, and
    /// later duplicates replay the stored outcome verbatim.
    pub async fn submit(&self, request: TransferRequest) -> TransferOutcome {
        let Some(key) = request.idempotency_key.clone() else {
            return self.process(&request).await;
        };

        loop {
            match self.idempotency.claim(&key) {
                Claim::Hit(outcome) => {
                    debug!(key, transaction_id = %outcome.transaction_id, "idempotent replay");
                    return outcome;
                }
                Claim::Owner(guard) => {
                    let outcome = self.process(&request).await;
                    guard.complete(outcome.clone());
                    return outcome;
                }
                Claim::Pending(mut rx) => {
                    if rx.changed().await.is_err() {
                        continue;
                    }
                    let resolved = rx.borrow().clone();
                    match resolved {
                        Some(outcome) => return outcome,
                        // Owner died without completing; retry the claim.
                        None => continue,
                    }
                }
            }
        }
    }

    /// Terminal outcome of a past transfer, by transaction id.
    pub fn get(&self, transaction_id: Uuid) -> Option<TransferOutcome> {
        self.records.get(&transaction_id).map(|r| r.clone())
    }

    #[instrument(skip(self, request), fields(from = %request.from_account, to = %request.to_account))]
    async fn process(&self, request: &TransferRequest) -> TransferOutcome {
        let transaction_id = Uuid::new_v4();
        let created_at = Utc::now();
        let mut phase = TransferPhase::Received;
        advance(&mut phase, TransferPhase::IdempotencyChecked, transaction_id);

        if let Err(e) = policy::validate(request) {
            advance(&mut phase, TransferPhase::Validated, transaction_id);
            advance(&mut phase, TransferPhase::Rejected, transaction_id);
            return self.finish(rejected(
                request,
                transaction_id,
                created_at,
                Decimal::ZERO,
                None,
                e,
            ));
        }

        // Fee depends on the debited account's VIP standing.
        let Some(from) = self.ledger.get(&request.from_account) else {
            advance(&mut phase, TransferPhase::Validated, transaction_id);
            advance(&mut phase, TransferPhase::Rejected, transaction_id);
            return self.finish(rejected(
                request,
                transaction_id,
                created_at,
                Decimal::ZERO,
                None,
                TransferError::AccountNotFound(request.from_account.clone()),
            ));
        };
        let fee = policy::fee_for(request.transaction_type, from.is_vip);
        advance(&mut phase, TransferPhase::Validated, transaction_id);

        let verdict = self
            .risk
            .assess(&RiskRequest {
                from_account: request.from_account.clone(),
                to_account: request.to_account.clone(),
                amount: request.amount,
                currency: request.currency.clone(),
                transaction_type: request.transaction_type,
            })
            .await;
        let risk_score = verdict.score();
        advance(&mut phase, TransferPhase::RiskChecked, transaction_id);

        if let Some(score) = risk_score {
            if score > RISK_BLOCK_THRESHOLD {
                advance(&mut phase, TransferPhase::Blocked, transaction_id);
                info!(
                    transaction_id = %transaction_id,
                    score,
                    "transfer blocked by risk gate"
                );
                let outcome = TransferOutcome {
                    transaction_id,
                    status: TransactionStatus::Blocked,
                    reason: Some(TransferError::RiskBlocked { score }),
                    from_account: request.from_account.clone(),
                    to_account: request.to_account.clone(),
                    amount: request.amount,
                    fee,
                    risk_score,
                    commit_seq: None,
                    created_at,
                    completed_at: None,
                };
                return self.finish(outcome);
            }
        }

        match self.ledger.apply_transfer(&TransferApply {
            transaction_id,
            from_account: request.from_account.clone(),
            to_account: request.to_account.clone(),
            amount: request.amount,
            fee,
            risk_score,
            created_at,
        }) {
            Ok(applied) => {
                advance(&mut phase, TransferPhase::Applied, transaction_id);
                advance(&mut phase, TransferPhase::Completed, transaction_id);
                let outcome = TransferOutcome {
                    transaction_id,
                    status: TransactionStatus::Completed,
                    reason: None,
                    from_account: request.from_account.clone(),
                    to_account: request.to_account.clone(),
                    amount: request.amount,
                    fee,
                    risk_score,
                    commit_seq: Some(applied.commit_seq),
                    created_at,
                    completed_at: Some(applied.completed_at),
                };
                // Completed event already went out inside the ledger's
                // critical section.
                self.records.insert(transaction_id, outcome.clone());
                outcome
            }
            Err(e) => {
                advance(&mut phase, TransferPhase::Applied, transaction_id);
                advance(&mut phase, TransferPhase::Rejected, transaction_id);
                self.finish(rejected(
                    request,
                    transaction_id,
                    created_at,
                    fee,
                    risk_score,
                    e,
                ))
            }
        }
    }

    /// Record a non-completed terminal outcome and publish its event.
    fn finish(&self, outcome: TransferOutcome) -> TransferOutcome {
        self.events.publish(TransactionEvent {
            event_type: outcome.status.event_type(),
            transaction_id: outcome.transaction_id,
            status: outcome.status,
            from_account: outcome.from_account.clone(),
            to_account: outcome.to_account.clone(),
            amount: outcome.amount,
            fee: outcome.fee,
            risk_score: outcome.risk_score,
            commit_seq: None,
            created_at: outcome.created_at,
            completed_at: None,
        });
        self.records.insert(outcome.transaction_id, outcome.clone());
        outcome
    }
}

fn advance(phase: &mut TransferPhase, next: TransferPhase, transaction_id: Uuid) {
    debug_assert!(phase.can_transition_to(next), "{} -> {}", phase, next);
    trace!(transaction_id = %transaction_id, from = %phase, to = %next, "phase transition");
    *phase = next;
}

fn rejected(
    request: &TransferRequest,
    transaction_id: Uuid,
    created_at: DateTime<Utc>,
    fee: Decimal,
    risk_score: Option<u8>,
    reason: TransferError,
) -> TransferOutcome {
    info!(
        transaction_id = %transaction_id,
        code = reason.code(),
        "transfer rejected"
    );
    TransferOutcome {
        transaction_id,
        status: TransactionStatus::Rejected,
        reason: Some(reason),
        from_account: request.from_account.clone(),
        to_account: request.to_account.clone(),
        amount: request.amount,
        fee,
        risk_score,
        created_at,
        commit_seq: None,
        completed_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountType};
    use crate::events::{channel, NullSink};
    use crate::risk::{HangingRiskScorer, StaticRiskScorer};
    use std::str::FromStr;
    use std::time::Duration;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn seeded_ledger(events: Arc<dyn EventSink>) -> Arc<LedgerStore> {
        let ledger = LedgerStore::new(events);
        ledger.insert(Account::new(
            "1111111111",
            AccountType::Checking,
            dec("10000.00"),
            "CUST001",
        ));
        let mut vip = Account::new("2222222222", AccountType::Savings, dec("50000.00"), "CUST002");
        vip.is_vip = true;
        ledger.insert(vip);
        Arc::new(ledger)
    }

    fn orchestrator_with(
        ledger: Arc<LedgerStore>,
        events: Arc<dyn EventSink>,
        score: u8,
    ) -> TransferOrchestrator {
        TransferOrchestrator::new(
            ledger,
            RiskGateClient::new(Arc::new(StaticRiskScorer(score)), Duration::from_millis(50)),
            Arc::new(IdempotencyCache::with_default_ttl()),
            events,
        )
    }

    fn quiet_orchestrator(score: u8) -> TransferOrchestrator {
        let events: Arc<dyn EventSink> = Arc::new(NullSink);
        orchestrator_with(seeded_ledger(Arc::clone(&events)), events, score)
    }

    #[tokio::test]
    async fn test_happy_path_completes_with_fee() {
        let orch = quiet_orchestrator(10);
        let outcome = orch
            .submit(TransferRequest::new("1111111111", "2222222222", dec("100.00")))
            .await;

        assert_eq!(outcome.status, TransactionStatus::Completed);
        assert_eq!(outcome.fee, dec("2.50"));
        assert_eq!(outcome.risk_score, Some(10));
        assert_eq!(outcome.commit_seq, Some(1));
        assert!(outcome.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_vip_debit_waives_fee() {
        let orch = quiet_orchestrator(10);
        let outcome = orch
            .submit(
                TransferRequest::new("2222222222", "1111111111", dec("200.00"))
                    .with_type(super::super::types::TransactionType::Wire),
            )
            .await;

        assert_eq!(outcome.status, TransactionStatus::Completed);
        assert_eq!(outcome.fee, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_score_above_threshold_blocks_before_ledger() {
        let events: Arc<dyn EventSink> = Arc::new(NullSink);
        let ledger = seeded_ledger(Arc::clone(&events));
        let orch = orchestrator_with(Arc::clone(&ledger), events, 85);

        let outcome = orch
            .submit(TransferRequest::new("1111111111", "2222222222", dec("100.00")))
            .await;

        assert_eq!(outcome.status, TransactionStatus::Blocked);
        assert_eq!(
            outcome.reason,
            Some(TransferError::RiskBlocked { score: 85 })
        );
        assert_eq!(outcome.commit_seq, None);
        // Ledger untouched
        assert_eq!(ledger.get("1111111111").unwrap().balance, dec("10000.00"));
        assert_eq!(ledger.last_commit_seq(), 0);
    }

    #[tokio::test]
    async fn test_threshold_is_strictly_greater_than() {
        let at = quiet_orchestrator(RISK_BLOCK_THRESHOLD);
        let outcome = at
            .submit(TransferRequest::new("1111111111", "2222222222", dec("10.00")))
            .await;
        assert_eq!(outcome.status, TransactionStatus::Completed);

        let above = quiet_orchestrator(RISK_BLOCK_THRESHOLD + 1);
        let outcome = above
            .submit(TransferRequest::new("1111111111", "2222222222", dec("10.00")))
            .await;
        assert_eq!(outcome.status, TransactionStatus::Blocked);
    }

    #[tokio::test]
    async fn test_risk_gate_timeout_fails_open() {
        let events: Arc<dyn EventSink> = Arc::new(NullSink);
        let orch = TransferOrchestrator::new(
            seeded_ledger(Arc::clone(&events)),
            RiskGateClient::new(Arc::new(HangingRiskScorer), Duration::from_millis(10)),
            Arc::new(IdempotencyCache::with_default_ttl()),
            events,
        );

        let outcome = orch
            .submit(TransferRequest::new("1111111111", "2222222222", dec("100.00")))
            .await;

        assert_eq!(outcome.status, TransactionStatus::Completed);
        assert_eq!(outcome.risk_score, None);
    }

    #[tokio::test]
    async fn test_insufficient_funds_rejected() {
        let orch = quiet_orchestrator(10);
        let outcome = orch
            .submit(TransferRequest::new("1111111111", "2222222222", dec("99999.00")))
            .await;

        assert_eq!(outcome.status, TransactionStatus::Rejected);
        assert_eq!(outcome.reason, Some(TransferError::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_validation_failure_skips_risk_and_ledger() {
        let events: Arc<dyn EventSink> = Arc::new(NullSink);
        let ledger = seeded_ledger(Arc::clone(&events));
        let orch = orchestrator_with(Arc::clone(&ledger), events, 10);

        let outcome = orch
            .submit(TransferRequest::new("1111111111", "1111111111", dec("100.00")))
            .await;

        assert_eq!(outcome.status, TransactionStatus::Rejected);
        assert_eq!(outcome.reason, Some(TransferError::SameAccount));
        assert_eq!(outcome.risk_score, None);
        assert_eq!(ledger.last_commit_seq(), 0);
    }

    #[tokio::test]
    async fn test_unknown_source_account_rejected() {
        let orch = quiet_orchestrator(10);
        let outcome = orch
            .submit(TransferRequest::new("4040404040", "2222222222", dec("100.00")))
            .await;
        assert_eq!(outcome.status, TransactionStatus::Rejected);
        assert!(matches!(
            outcome.reason,
            Some(TransferError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_idempotent_replay_returns_same_outcome_once_applied() {
        let events: Arc<dyn EventSink> = Arc::new(NullSink);
        let ledger = seeded_ledger(Arc::clone(&events));
        let orch = orchestrator_with(Arc::clone(&ledger), events, 10);

        let request = TransferRequest::new("1111111111", "2222222222", dec("50.00"))
            .with_idempotency_key("pay-001");

        let first = orch.submit(request.clone()).await;
        let second = orch.submit(request).await;

        assert_eq!(first.transaction_id, second.transaction_id);
        assert_eq!(second.status, TransactionStatus::Completed);
        // Single debit of 50.00 + 2.50
        assert_eq!(ledger.get("1111111111").unwrap().balance, dec("9947.50"));
        assert_eq!(ledger.last_commit_seq(), 1);
    }

    #[tokio::test]
    async fn test_rejected_outcome_replayed_not_retried() {
        let events: Arc<dyn EventSink> = Arc::new(NullSink);
        let ledger = seeded_ledger(Arc::clone(&events));
        let orch = orchestrator_with(Arc::clone(&ledger), events, 10);

        let request = TransferRequest::new("1111111111", "2222222222", dec("99999.00"))
            .with_idempotency_key("pay-002");

        let first = orch.submit(request.clone()).await;
        let second = orch.submit(request).await;

        assert_eq!(first.status, TransactionStatus::Rejected);
        assert_eq!(first.transaction_id, second.transaction_id);
    }

    #[tokio::test]
    async fn test_outcome_retrievable_by_transaction_id() {
        let orch = quiet_orchestrator(10);
        let outcome = orch
            .submit(TransferRequest::new("1111111111", "2222222222", dec("100.00")))
            .await;

        let fetched = orch.get(outcome.transaction_id).unwrap();
        assert_eq!(fetched.status, TransactionStatus::Completed);
        assert!(orch.get(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_blocked_and_rejected_events_published() {
        let (publisher, mut rx) = channel();
        let events: Arc<dyn EventSink> = Arc::new(publisher);
        let ledger = seeded_ledger(Arc::clone(&events));
        let orch = orchestrator_with(ledger, events, 85);

        orch.submit(TransferRequest::new("1111111111", "2222222222", dec("100.00")))
            .await;
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "transaction.blocked");
        assert_eq!(event.risk_score, Some(85));
        assert_eq!(event.commit_seq, None);
    }
}
