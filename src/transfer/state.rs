//! Transfer State Machine Definitions
//!
//! One request moves through these phases in order, with early exits to
//! the terminal `Rejected` and `Blocked` phases. Only `Completed`,
//! `Rejected` and `Blocked` are externally observable.

use std::fmt;

/// Transfer processing phases
///
/// ```text
/// Received -> IdempotencyChecked -> Validated -> RiskChecked -> Applied -> Completed
///                                       |             |             |
///                                   Rejected       Blocked      Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferPhase {
    /// Request accepted by the orchestrator
    Received,
    /// Idempotency key looked up (or absent); this request owns execution
    IdempotencyChecked,
    /// Format, fee and bounds validation passed
    Validated,
    /// Risk gate consulted (scored or failed open)
    RiskChecked,
    /// Ledger mutation committed
    Applied,
    /// Terminal: transfer completed and event emitted
    Completed,
    /// Terminal: validation or funds/limit failure
    Rejected,
    /// Terminal: risk score above threshold, ledger untouched
    Blocked,
}

impl TransferPhase {
    /// Check if this is a terminal phase (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferPhase::Completed | TransferPhase::Rejected | TransferPhase::Blocked
        )
    }

    /// Legal transitions of the orchestration state machine
    pub fn can_transition_to(&self, next: TransferPhase) -> bool {
        use TransferPhase::*;
        matches!(
            (self, next),
            (Received, IdempotencyChecked)
                | (IdempotencyChecked, Validated)
                | (Validated, RiskChecked)
                | (Validated, Rejected)
                | (RiskChecked, Applied)
                | (RiskChecked, Blocked)
                | (Applied, Completed)
                | (Applied, Rejected)
        )
    }

    /// Get human-readable phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferPhase::Received => "RECEIVED",
            TransferPhase::IdempotencyChecked => "IDEMPOTENCY_CHECKED",
            TransferPhase::Validated => "VALIDATED",
            TransferPhase::RiskChecked => "RISK_CHECKED",
            TransferPhase::Applied => "APPLIED",
            TransferPhase::Completed => "COMPLETED",
            TransferPhase::Rejected => "REJECTED",
            TransferPhase::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
