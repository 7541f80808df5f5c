//! Idempotency cache
//!
//! At-most-once execution per client-supplied key. The first request for
//! a key claims it and runs the transfer; concurrent duplicates wait on a
//! watch channel for the owner's terminal outcome; later duplicates get
//! the stored outcome without touching the ledger. If an owner dies
//! without completing, the claim is released and one waiter retries.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::transfer::TransferOutcome;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

enum Slot {
    /// Owner still processing; receiver resolves to its outcome, or to
    /// `None` if the owner dropped without completing.
    InFlight(watch::Receiver<Option<TransferOutcome>>),
    Done {
        outcome: TransferOutcome,
        stored_at: Instant,
    },
}

/// Result of attempting to claim a key.
pub enum Claim<'a> {
    /// This request owns execution; complete or drop the guard.
    Owner(ClaimGuard<'a>),
    /// A previous request already finished; replay its outcome.
    Hit(TransferOutcome),
    /// Another request is mid-flight; await its outcome.
    Pending(watch::Receiver<Option<TransferOutcome>>),
}

/// Keyed outcome cache with single-owner claims.
pub struct IdempotencyCache {
    slots: DashMap<String, Slot>,
    ttl: Duration,
}

impl IdempotencyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Claim a key, or learn about the existing claim.
    ///
    /// Entry-API access keeps check-and-insert atomic per key.
    pub fn claim(&self, key: &str) -> Claim<'_> {
        use dashmap::mapref::entry::Entry;

        enum Existing {
            Expired,
            Hit(TransferOutcome),
            Pending(watch::Receiver<Option<TransferOutcome>>),
        }

        match self.slots.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let existing = match occupied.get() {
                    Slot::Done { outcome, stored_at } => {
                        if stored_at.elapsed() >= self.ttl {
                            Existing::Expired
                        } else {
                            Existing::Hit(outcome.clone())
                        }
                    }
                    Slot::InFlight(rx) => Existing::Pending(rx.clone()),
                };
                match existing {
                    Existing::Expired => {
                        debug!(key, "idempotency entry expired, reclaiming");
                        let (tx, rx) = watch::channel(None);
                        occupied.insert(Slot::InFlight(rx));
                        Claim::Owner(ClaimGuard {
                            key: key.to_string(),
                            tx,
                            completed: false,
                            cache: self,
                        })
                    }
                    Existing::Hit(outcome) => {
                        trace!(key, "idempotency hit");
                        Claim::Hit(outcome)
                    }
                    Existing::Pending(rx) => {
                        trace!(key, "idempotency claim pending");
                        Claim::Pending(rx)
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(None);
                vacant.insert(Slot::InFlight(rx));
                Claim::Owner(ClaimGuard {
                    key: key.to_string(),
                    tx,
                    completed: false,
                    cache: self,
                })
            }
        }
    }

    /// Drop expired `Done` entries. Called periodically from a
    /// maintenance task; in-flight claims are never purged.
    pub fn purge_expired(&self) -> usize {
        let before = self.slots.len();
        let ttl = self.ttl;
        self.slots.retain(|_, slot| match slot {
            Slot::InFlight(_) => true,
            Slot::Done { stored_at, .. } => stored_at.elapsed() < ttl,
        });
        let purged = before - self.slots.len();
        if purged > 0 {
            debug!(purged, "purged expired idempotency entries");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn store(&self, key: &str, outcome: TransferOutcome) {
        self.slots.insert(
            key.to_string(),
            Slot::Done {
                outcome,
                stored_at: Instant::now(),
            },
        );
    }

    fn release(&self, key: &str) {
        self.slots.remove(key);
    }
}

/// Exclusive right to execute the transfer for one key.
///
/// Dropping the guard without `complete` releases the claim and wakes
/// waiters with `None`, letting one of them retry.
pub struct ClaimGuard<'a> {
    key: String,
    tx: watch::Sender<Option<TransferOutcome>>,
    completed: bool,
    cache: &'a IdempotencyCache,
}

impl ClaimGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record the terminal outcome and wake every waiter.
    pub fn complete(mut self, outcome: TransferOutcome) {
        self.cache.store(&self.key, outcome.clone());
        let _ = self.tx.send(Some(outcome));
        self.completed = true;
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.cache.release(&self.key);
            let _ = self.tx.send(None);
        }
    }
}
