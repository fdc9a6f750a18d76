//! Meta miner — block-store/treasury mining target.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::MiningTarget;
use crate::types::MineCall;
use crate::wallet::Session;

const TARGET_NAME: &str = "meta";
const MODULE: &str = "meta";
const FUNCTION: &str = "mine";

pub struct MetaMiner {
    session: Arc<Session>,
    package_id: String,
    block_store_id: String,
    treasury_id: String,
}

impl MetaMiner {
    pub fn new(
        session: Arc<Session>,
        package_id: String,
        block_store_id: String,
        treasury_id: String,
    ) -> Self {
        Self {
            session,
            package_id,
            block_store_id,
            treasury_id,
        }
    }

    fn build_call(&self) -> MineCall {
        MineCall {
            package_id: self.package_id.clone(),
            module: MODULE.to_string(),
            function: FUNCTION.to_string(),
            arguments: vec![json!(self.block_store_id), json!(self.treasury_id)],
        }
    }
}

#[async_trait]
impl MiningTarget for MetaMiner {
    async fn mine(&self) -> Result<()> {
        let call = self.build_call();
        debug!(target = TARGET_NAME, call = %call, "Submitting mine call");

        self.session
            .execute_mine(&call)
            .await
            .context("Meta mine submission failed")
    }

    fn name(&self) -> &str {
        TARGET_NAME
    }
}
