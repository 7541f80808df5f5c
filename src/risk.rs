//! Risk gate client
//!
//! Every transfer is scored by an external fraud-detection service
//! before it touches the ledger. The client enforces a hard deadline and
//! fails open: timeouts and transport errors yield
//! `RiskVerdict::Unavailable` and the transfer proceeds unscored.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::transfer::TransactionType;

pub const MAX_RISK_SCORE: u8 = 100;

/// Payload sent to the scoring service.
#[derive(Debug, Clone, Serialize)]
pub struct RiskRequest {
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_type: TransactionType,
}

/// What the gate said about one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskVerdict {
    /// Service answered with a score in 0..=100.
    Scored(u8),
    /// Timeout or transport failure; caller proceeds unscored.
    Unavailable,
}

impl RiskVerdict {
    pub fn score(&self) -> Option<u8> {
        match self {
            RiskVerdict::Scored(s) => Some(*s),
            RiskVerdict::Unavailable => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum RiskGateError {
    #[error("risk gate transport failure: {0}")]
    Transport(String),

    #[error("risk gate returned malformed response: {0}")]
    Malformed(String),
}

/// Scoring backend. Implemented over HTTP in production and by static
/// doubles in tests.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, request: &RiskRequest) -> Result<u8, RiskGateError>;
}

/// Deadline-enforcing wrapper around a [`RiskScorer`].
pub struct RiskGateClient {
    scorer: Arc<dyn RiskScorer>,
    deadline: Duration,
}

impl RiskGateClient {
    pub fn new(scorer: Arc<dyn RiskScorer>, deadline: Duration) -> Self {
        Self { scorer, deadline }
    }

    /// Score one transfer, degrading to `Unavailable` on any failure.
    pub async fn assess(&self, request: &RiskRequest) -> RiskVerdict {
        match tokio::time::timeout(self.deadline, self.scorer.score(request)).await {
            Ok(Ok(score)) => {
                let score = score.min(MAX_RISK_SCORE);
                debug!(
                    scorer = self.scorer.name(),
                    score,
                    from = %request.from_account,
                    "risk gate scored transfer"
                );
                RiskVerdict::Scored(score)
            }
            Ok(Err(e)) => {
                warn!(scorer = self.scorer.name(), "risk gate failed, proceeding unscored: {}", e);
                RiskVerdict::Unavailable
            }
            Err(_) => {
                warn!(
                    scorer = self.scorer.name(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "risk gate deadline exceeded, proceeding unscored"
                );
                RiskVerdict::Unavailable
            }
        }
    }
}

/// HTTP backend posting to the scoring service.
pub struct HttpRiskScorer {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    risk_score: i64,
}

impl HttpRiskScorer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RiskScorer for HttpRiskScorer {
    fn name(&self) -> &str {
        "http"
    }

    async fn score(&self, request: &RiskRequest) -> Result<u8, RiskGateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| RiskGateError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RiskGateError::Transport(format!(
                "status {}",
                response.status()
            )));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| RiskGateError::Malformed(e.to_string()))?;

        if !(0..=MAX_RISK_SCORE as i64).contains(&body.risk_score) {
            return Err(RiskGateError::Malformed(format!(
                "risk_score {} out of range",
                body.risk_score
            )));
        }
        Ok(body.risk_score as u8)
    }
}

/// Always answers with a fixed score. Test and local-dev double.
#[cfg(any(test, feature = "mock-risk"))]
pub struct StaticRiskScorer(pub u8);

#[cfg(any(test, feature = "mock-risk"))]
#[async_trait]
impl RiskScorer for StaticRiskScorer {
    fn name(&self) -> &str {
        "static"
    }

    async fn score(&self, _request: &RiskRequest) -> Result<u8, RiskGateError> {
        Ok(self.0)
    }
}

/// Never answers. Exercises the deadline path.
#[cfg(any(test, feature = "mock-risk"))]
pub struct HangingRiskScorer;

#[cfg(any(test, feature = "mock-risk"))]
#[async_trait]
impl RiskScorer for HangingRiskScorer {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn score(&self, _request: &RiskRequest) -> Result<u8, RiskGateError> {
        std::future::pending().await
    }
}

/// Always fails with a transport error.
#[cfg(any(test, feature = "mock-risk"))]
pub struct FailingRiskScorer;

#[cfg(any(test, feature = "mock-risk"))]
#[async_trait]
impl RiskScorer for FailingRiskScorer {
    fn name(&self) -> &str {
        "failing"
    }

    async fn score(&self, _request: &RiskRequest) -> Result<u8, RiskGateError> {
        Err(RiskGateError::Transport("connection refused".to_string()))
    }
}
