//! Event publisher
//!
//! Terminal transfer outcomes are published as `TransactionEvent`s on an
//! in-process channel. Publishing is synchronous and non-blocking; a full
//! or closed channel drops the event with a warning and never fails the
//! transfer itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::transfer::TransactionStatus;

/// One emitted transaction event.
///
/// Events for the same account are published in that account's commit
/// order; `commit_seq` is the global total order over completed
/// transfers.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionEvent {
    pub event_type: &'static str,
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    pub fee: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_seq: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Sink for terminal transfer events.
///
/// Implementations must not block: `publish` is called from inside the
/// ledger's pair critical section for completed transfers.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: TransactionEvent);
}

/// Publishes events onto an unbounded in-process channel.
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<TransactionEvent>,
}

impl ChannelPublisher {
    pub fn new(tx: mpsc::UnboundedSender<TransactionEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelPublisher {
    fn publish(&self, event: TransactionEvent) {
        if let Err(e) = self.tx.send(event) {
            warn!(target: "events", "event channel closed, dropping {}", e.0.event_type);
        }
    }
}

/// Create a publisher and its consumer end.
pub fn channel() -> (ChannelPublisher, mpsc::UnboundedReceiver<TransactionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelPublisher::new(tx), rx)
}

/// Drops every event. Used where no consumer is attached.
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: TransactionEvent) {}
}

/// Drain the event channel into the structured log.
///
/// Runs until every publisher handle is dropped.
pub fn spawn_log_consumer(
    mut rx: mpsc::UnboundedReceiver<TransactionEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(payload) => {
                    info!(target: "events", event_type = event.event_type, %payload)
                }
                Err(e) => warn!(target: "events", "failed to serialize event: {}", e),
            }
        }
    })
}
