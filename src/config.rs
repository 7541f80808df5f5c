use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub risk_gate: RiskGateConfig,
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
    /// Seed accounts loaded into the ledger at startup
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,
}

fn default_accounts_file() -> String {
    "config/accounts.yaml".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RiskGateConfig {
    /// Scoring service endpoint; when absent the mock scorer is used
    pub url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for RiskGateConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 500,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdempotencyConfig {
    pub ttl_secs: u64,
    pub purge_interval_secs: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            purge_interval_secs: 60,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
