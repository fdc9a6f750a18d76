//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The wallet credential is referenced by env-var name in the config
//! and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Production retry policy for ledger RPC calls.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

/// Pause between trigger-loop iterations.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3500;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub rpc: RpcConfig,
    pub watch: WatchConfig,
    pub wallet: WalletConfig,
    pub miners: MinersConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Log prepared mine calls instead of submitting them.
    #[serde(default = "default_true")]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RpcConfig {
    pub url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// What to watch on-chain and what amount triggers mining.
#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    /// Object id whose input-transactions are polled.
    pub object_id: String,
    /// Exact coin-type string a balance change must carry.
    pub coin_type: String,
    /// Decimal amount string that triggers a mine call.
    pub expected_amount: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalletConfig {
    /// Env var holding the private key or seed phrase.
    pub phrase_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MinersConfig {
    pub meta: MetaMinerConfig,
    pub fomo: FomoMinerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetaMinerConfig {
    pub enabled: bool,
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub block_store_id: String,
    #[serde(default)]
    pub treasury_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FomoMinerConfig {
    pub enabled: bool,
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub config_id: String,
    #[serde(default)]
    pub buses: Vec<String>,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
