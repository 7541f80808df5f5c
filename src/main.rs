//! Fundgate - Risk-Gated Funds-Transfer Engine
//!
//! Entry point. Wires config, logging, the ledger, the risk gate client,
//! the idempotency cache and the event consumer, then serves HTTP.
//!
//! ```text
//! ┌─────────┐    ┌──────────────┐    ┌────────┐    ┌────────┐
//! │ Gateway │───▶│ Orchestrator │───▶│ Ledger │───▶│ Events │
//! │ (axum)  │    │ (idem+risk)  │    │ (pair  │    │ (chan) │
//! └─────────┘    └──────────────┘    │  lock) │    └────────┘
//!                                    └────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use fundgate::account::{Account, AccountSeed, LedgerStore};
use fundgate::config::AppConfig;
use fundgate::events::{self, EventSink};
use fundgate::gateway::{self, state::AppState};
use fundgate::idempotency::IdempotencyCache;
use fundgate::risk::{HttpRiskScorer, RiskGateClient, RiskScorer};
use fundgate::transfer::TransferOrchestrator;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn load_seed_accounts(path: &str) -> anyhow::Result<Vec<AccountSeed>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read accounts file: {}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("failed to parse {}", path))
}

#[cfg(feature = "mock-risk")]
fn fallback_scorer() -> Arc<dyn RiskScorer> {
    info!("risk gate url not set, using static mock scorer");
    Arc::new(fundgate::risk::StaticRiskScorer(10))
}

#[cfg(not(feature = "mock-risk"))]
fn fallback_scorer() -> Arc<dyn RiskScorer> {
    panic!("risk_gate.url must be configured when mock-risk is disabled")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _log_guard = fundgate::logging::init_logging(&config);

    info!("starting fundgate in {} mode", env);

    // Event stream: published from the transfer path, drained to the log
    let (publisher, event_rx) = events::channel();
    let events: Arc<dyn EventSink> = Arc::new(publisher);
    let _event_consumer = events::spawn_log_consumer(event_rx);

    // Ledger with seed accounts
    let ledger = Arc::new(LedgerStore::new(Arc::clone(&events)));
    let seeds = load_seed_accounts(&config.accounts_file)?;
    for seed in seeds {
        ledger.insert(Account::from_seed(seed));
    }
    info!("seeded {} accounts from {}", ledger.len(), config.accounts_file);

    // Risk gate: HTTP when configured, mock fallback otherwise
    let scorer: Arc<dyn RiskScorer> = match &config.risk_gate.url {
        Some(url) => Arc::new(HttpRiskScorer::new(url.clone())),
        None => fallback_scorer(),
    };
    let risk = RiskGateClient::new(scorer, Duration::from_millis(config.risk_gate.timeout_ms));

    // Idempotency cache with periodic purge
    let idempotency = Arc::new(IdempotencyCache::new(Duration::from_secs(
        config.idempotency.ttl_secs,
    )));
    {
        let cache = Arc::clone(&idempotency);
        let interval = Duration::from_secs(config.idempotency.purge_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                cache.purge_expired();
            }
        });
    }

    let orchestrator = Arc::new(TransferOrchestrator::new(
        Arc::clone(&ledger),
        risk,
        idempotency,
        events,
    ));

    let state = Arc::new(AppState::new(orchestrator, ledger));
    let port = get_port_override().unwrap_or(config.gateway.port);
    gateway::serve(state, &config.gateway.host, port).await
}
