use std::sync::Arc;

use crate::account::LedgerStore;
use crate::transfer::TransferOrchestrator;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// Transfer pipeline entry point
    pub orchestrator: Arc<TransferOrchestrator>,
    /// Account ledger (read-only from handlers)
    pub ledger: Arc<LedgerStore>,
}

impl AppState {
    pub fn new(orchestrator: Arc<TransferOrchestrator>, ledger: Arc<LedgerStore>) -> Self {
        Self { orchestrator, ledger }
    }
}
