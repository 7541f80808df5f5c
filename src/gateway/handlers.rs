//! HTTP handlers
//!
//! Thin adapters from axum extractors to the orchestrator and ledger.
//! Status mapping: 200 completed, 400 policy violation, 403 risk block,
//! 404 missing resource, 422 validation failure.

pub mod account;
pub mod health;
pub mod transaction;

pub use account::get_account;
pub use health::{health_check, HealthResponse};
pub use transaction::{create_transaction, get_transaction};
