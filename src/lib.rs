//! Fundgate - Risk-Gated Funds-Transfer Engine
//!
//! Idempotent account-to-account transfers with fee pricing, daily
//! limits, external risk scoring and an ordered event stream.
//!
//! # Modules
//!
//! - [`money`] - Decimal money helpers and the strict Serde amount type
//! - [`account`] - Account models and the concurrent ledger store
//! - [`policy`] - Fee schedule, validation and limit predicates
//! - [`idempotency`] - Keyed outcome cache with single-owner claims
//! - [`risk`] - Risk gate client (deadline-enforced, fail-open)
//! - [`transfer`] - Orchestrator, state machine and error taxonomy
//! - [`events`] - Terminal transaction event publishing
//! - [`gateway`] - Axum HTTP gateway

pub mod config;
pub mod logging;
pub mod money;

pub mod account;
pub mod events;
pub mod gateway;
pub mod idempotency;
pub mod policy;
pub mod risk;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountType, LedgerStore};
pub use events::{ChannelPublisher, EventSink, NullSink, TransactionEvent};
pub use idempotency::IdempotencyCache;
pub use risk::{RiskGateClient, RiskScorer, RiskVerdict};
pub use transfer::{
    TransactionStatus, TransactionType, TransferError, TransferOrchestrator, TransferOutcome,
    TransferRequest, RISK_BLOCK_THRESHOLD,
};
