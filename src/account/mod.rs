//! Account Ledger module
//!
//! In-memory account records and the concurrent ledger store that
//! applies transfers atomically across account pairs.

pub mod models;
pub mod store;

pub use models::{Account, AccountSeed, AccountType};
pub use store::{AppliedTransfer, LedgerStore, TransferApply};
