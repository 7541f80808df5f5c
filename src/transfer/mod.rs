//! Transfer Orchestration
//!
//! The orchestrator drives one transfer through idempotency claim,
//! validation, risk scoring and the atomic ledger apply, producing an
//! immutable terminal [`TransferOutcome`].
//!
//! # Pipeline
//!
//! ```text
//! submit -> claim key -> validate -> risk gate -> apply -> outcome
//!              |             |           |          |
//!           replay        Rejected    Blocked    Rejected
//! ```

pub mod error;
pub mod orchestrator;
pub mod state;
pub mod types;

pub use error::TransferError;
pub use orchestrator::{TransferOrchestrator, RISK_BLOCK_THRESHOLD};
pub use state::TransferPhase;
pub use types::{TransactionStatus, TransactionType, TransferOutcome, TransferRequest};
