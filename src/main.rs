//! PROSPECTOR — Autonomous On-Chain Mining Trigger Agent
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the wallet session, and spawns one trigger loop per enabled
//! mining target. Runs until Ctrl+C.

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use prospector::config::AppConfig;
use prospector::engine::fetcher::SignalFetcher;
use prospector::engine::trigger::TriggerLoop;
use prospector::ledger::sui::SuiRpcClient;
use prospector::ledger::LedgerRpc;
use prospector::miner::fomo::FomoMiner;
use prospector::miner::meta::MetaMiner;
use prospector::miner::MiningTarget;
use prospector::retry::RetryPolicy;
use prospector::types::Signal;
use prospector::wallet::{Credential, Session};

const BANNER: &str = r#"
  ____  ____   ___  ____  ____  _____ ____ _____ ___  ____
 |  _ \|  _ \ / _ \/ ___||  _ \| ____/ ___|_   _/ _ \|  _ \
 | |_) | |_) | | | \___ \| |_) |  _|| |     | || | | | |_) |
 |  __/|  _ <| |_| |___) |  __/| |__| |___  | || |_| |  _ <
 |_|   |_| \_\\___/|____/|_|   |_____\____| |_| \___/|_| \_\

  On-Chain Mining Trigger Agent
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        rpc_url = %cfg.rpc.url,
        poll_interval_ms = cfg.agent.poll_interval_ms,
        dry_run = cfg.agent.dry_run,
        "PROSPECTOR starting up"
    );

    // -- Wallet session (shared read-only by all loops) --------------------

    let phrase = AppConfig::resolve_env(&cfg.wallet.phrase_env)?;
    let credential = Credential::parse(&phrase)?;
    let session = Arc::new(Session::connect(credential, cfg.agent.dry_run));

    // -- Ledger client ------------------------------------------------------

    let rpc: Arc<dyn LedgerRpc> = Arc::new(SuiRpcClient::new(&cfg.rpc.url, cfg.rpc.timeout_secs)?);
    let retry = RetryPolicy::new(
        cfg.rpc.max_attempts,
        Duration::from_millis(cfg.rpc.retry_delay_ms),
    );

    // -- One trigger loop per enabled target --------------------------------

    let mut handles = Vec::new();

    if cfg.miners.meta.enabled {
        let miner = MetaMiner::new(
            session.clone(),
            cfg.miners.meta.package_id.clone(),
            cfg.miners.meta.block_store_id.clone(),
            cfg.miners.meta.treasury_id.clone(),
        );
        handles.push(spawn_loop(&cfg, rpc.clone(), retry, Box::new(miner)));
    }

    if cfg.miners.fomo.enabled {
        let miner = FomoMiner::new(
            session.clone(),
            cfg.miners.fomo.package_id.clone(),
            cfg.miners.fomo.config_id.clone(),
            cfg.miners.fomo.buses.clone(),
        )?;
        handles.push(spawn_loop(&cfg, rpc.clone(), retry, Box::new(miner)));
    }

    if handles.is_empty() {
        bail!("no mining targets enabled — enable [miners.meta] or [miners.fomo] in config.toml");
    }

    info!(loops = handles.len(), "All trigger loops running. Press Ctrl+C to stop.");

    // The loops never finish on their own; wait for the shutdown signal.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    for handle in handles {
        handle.abort();
    }

    info!("PROSPECTOR shut down.");
    Ok(())
}

/// Build a fetcher + trigger loop for one target and spawn it.
fn spawn_loop(
    cfg: &AppConfig,
    rpc: Arc<dyn LedgerRpc>,
    retry: RetryPolicy,
    miner: Box<dyn MiningTarget>,
) -> tokio::task::JoinHandle<()> {
    let fetcher = SignalFetcher::new(
        rpc,
        cfg.watch.object_id.clone(),
        cfg.watch.coin_type.clone(),
        retry,
    );

    let trigger = TriggerLoop::new(
        fetcher,
        miner,
        Signal::from(cfg.watch.expected_amount.as_str()),
        Duration::from_millis(cfg.agent.poll_interval_ms),
    );

    tokio::spawn(trigger.run())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prospector=info"));

    let json_logging = std::env::var("PROSPECTOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
