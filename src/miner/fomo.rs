//! FOMO miner — bus-based mining target.
//!
//! The FOMO package spreads contention across a set of shared "bus"
//! objects; each submission picks the next bus round-robin so repeated
//! triggers don't pile onto the same object.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::MiningTarget;
use crate::types::MineCall;
use crate::wallet::Session;

const TARGET_NAME: &str = "fomo";
const MODULE: &str = "fomo";
const FUNCTION: &str = "mine";

pub struct FomoMiner {
    session: Arc<Session>,
    package_id: String,
    config_id: String,
    buses: Vec<String>,
    next_bus: AtomicUsize,
}

impl FomoMiner {
    pub fn new(
        session: Arc<Session>,
        package_id: String,
        config_id: String,
        buses: Vec<String>,
    ) -> Result<Self> {
        if buses.is_empty() {
            bail!("FOMO miner requires at least one bus object id");
        }
        Ok(Self {
            session,
            package_id,
            config_id,
            buses,
            next_bus: AtomicUsize::new(0),
        })
    }

    fn pick_bus(&self) -> &str {
        let idx = self.next_bus.fetch_add(1, Ordering::Relaxed) % self.buses.len();
        &self.buses[idx]
    }

    fn build_call(&self, bus: &str) -> MineCall {
        MineCall {
            package_id: self.package_id.clone(),
            module: MODULE.to_string(),
            function: FUNCTION.to_string(),
            arguments: vec![json!(self.config_id), json!(bus)],
        }
    }
}

#[async_trait]
impl MiningTarget for FomoMiner {
    async fn mine(&self) -> Result<()> {
        let bus = self.pick_bus();
        let call = self.build_call(bus);
        debug!(target = TARGET_NAME, bus = %bus, call = %call, "Submitting mine call");

        self.session
            .execute_mine(&call)
            .await
            .context("FOMO mine submission failed")
    }

    fn name(&self) -> &str {
        TARGET_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Credential;

    fn session() -> Arc<Session> {
        Arc::new(Session::connect(
            Credential::parse("suiprivkey1q").unwrap(),
            true,
        ))
    }

    #[test]
    fn test_requires_at_least_one_bus() {
        let result = FomoMiner::new(session(), "0xpkg".into(), "0xcfg".into(), vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_round_robin_bus_selection() {
        let miner = FomoMiner::new(
            session(),
            "0xpkg".into(),
            "0xcfg".into(),
            vec!["0xbus1".into(), "0xbus2".into()],
        )
        .unwrap();

        assert_eq!(miner.pick_bus(), "0xbus1");
        assert_eq!(miner.pick_bus(), "0xbus2");
        assert_eq!(miner.pick_bus(), "0xbus1");
    }

    #[test]
    fn test_build_call_targets_fomo_module() {
        let miner = FomoMiner::new(
            session(),
            "0xpkg".into(),
            "0xcfg".into(),
            vec!["0xbus1".into()],
        )
        .unwrap();

        let call = miner.build_call("0xbus1");
        assert_eq!(call.module, "fomo");
        assert_eq!(call.arguments, vec![json!("0xcfg"), json!("0xbus1")]);
    }

    #[tokio::test]
    async fn test_mine_dry_run() {
        let miner = FomoMiner::new(
            session(),
            "0xpkg".into(),
            "0xcfg".into(),
            vec!["0xbus1".into()],
        )
        .unwrap();

        assert_eq!(miner.name(), "fomo");
        assert!(miner.mine().await.is_ok());
    }
}
