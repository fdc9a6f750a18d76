//! Sui JSON-RPC client.
//!
//! Speaks JSON-RPC 2.0 over HTTPS POST to a single configured fullnode
//! endpoint. Only the two read methods the agent needs are implemented:
//!
//! - `suix_queryTransactionBlocks` — newest transaction touching the
//!   watched object (input-object filter, limit 1, descending).
//! - `sui_getTransactionBlock` — balance changes for one digest, with
//!   every other detail flag disabled to keep the payload small.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{BalanceChange, LedgerError, LedgerRpc, TransactionSummary};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Wire envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Page shape returned by `suix_queryTransactionBlocks`.
#[derive(Debug, Deserialize)]
struct TransactionsPage {
    #[serde(default)]
    data: Vec<TransactionSummary>,
}

/// The slice of `sui_getTransactionBlock` we ask for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBlock {
    #[serde(default)]
    balance_changes: Option<Vec<BalanceChange>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Reqwest-backed Sui fullnode client.
pub struct SuiRpcClient {
    http: Client,
    url: String,
    /// Monotonic JSON-RPC request id.
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(url: &str, timeout_secs: Option<u64>) -> Result<Self, LedgerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(
                timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .user_agent("PROSPECTOR/0.1.0 (mining-trigger-agent)")
            .build()?;

        Ok(Self {
            http,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Params for the newest-transaction query: input-object filter,
    /// no cursor, limit 1, descending order.
    fn query_params(object_id: &str) -> Value {
        json!([
            {
                "filter": { "InputObject": object_id },
                "options": null
            },
            null,
            1,
            true
        ])
    }

    /// Params for the block fetch: balance changes only, every other
    /// detail flag off.
    fn block_params(digest: &str) -> Value {
        json!([
            digest,
            {
                "showInput": false,
                "showRawInput": false,
                "showEffects": false,
                "showEvents": false,
                "showObjectChanges": false,
                "showBalanceChanges": true,
                "showRawEffects": false
            }
        ])
    }

    /// Send one JSON-RPC request and decode the `result` field.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "Sending ledger RPC request");

        let resp = self.http.post(&self.url).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Status { status, body });
        }

        let envelope: RpcEnvelope<T> = resp
            .json()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(LedgerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| LedgerError::Decode(format!("{method}: missing result field")))
    }
}

#[async_trait]
impl LedgerRpc for SuiRpcClient {
    async fn latest_transaction_for_object(
        &self,
        object_id: &str,
    ) -> Result<Option<TransactionSummary>, LedgerError> {
        let page: TransactionsPage = self
            .call(
                "suix_queryTransactionBlocks",
                Self::query_params(object_id),
            )
            .await?;

        Ok(page.data.into_iter().next())
    }

    async fn balance_changes(
        &self,
        digest: &str,
    ) -> Result<Option<Vec<BalanceChange>>, LedgerError> {
        let block: TransactionBlock = self
            .call("sui_getTransactionBlock", Self::block_params(digest))
            .await?;

        Ok(block.balance_changes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
