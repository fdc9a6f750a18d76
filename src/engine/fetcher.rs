//! Signal extraction from ledger state.
//!
//! Two-step query: find the newest transaction that touched the watched
//! object, then pull that transaction's balance changes and take the
//! amount for the configured coin type. Each remote call is individually
//! wrapped in the retry helper, so one flaky response never aborts a
//! polling cycle on its own.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::ledger::LedgerRpc;
use crate::retry::{call_with_retry, RetryPolicy};
use crate::types::Signal;

/// Derives one [`Signal`] per call from current ledger state.
pub struct SignalFetcher {
    rpc: Arc<dyn LedgerRpc>,
    /// Object whose input-transactions we watch.
    object_id: String,
    /// Exact coin-type string a balance change must carry.
    coin_type: String,
    retry: RetryPolicy,
}

impl SignalFetcher {
    pub fn new(
        rpc: Arc<dyn LedgerRpc>,
        object_id: String,
        coin_type: String,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            rpc,
            object_id,
            coin_type,
            retry,
        }
    }

    /// Fetch the current signal.
    ///
    /// `Ok(None)` means the ledger answered but held no data for us this
    /// cycle (no transactions yet, no balance-change list, or no entry
    /// with the watched coin type). `Err` means both steps' retries were
    /// exhausted — callers must treat that differently from "no data".
    pub async fn fetch_signal(&self) -> Result<Option<Signal>> {
        // Step 1: newest transaction touching the watched object.
        let latest = call_with_retry(
            || self.rpc.latest_transaction_for_object(&self.object_id),
            &self.retry,
        )
        .await?;

        let Some(tx) = latest else {
            debug!(object_id = %self.object_id, "No transactions for watched object");
            return Ok(None);
        };

        debug!(
            digest = %tx.digest,
            seen_at = %Self::format_timestamp(tx.timestamp_ms.as_deref()),
            "Latest transaction located"
        );

        // Step 2: balance changes for that digest.
        let changes = call_with_retry(|| self.rpc.balance_changes(&tx.digest), &self.retry).await?;

        let Some(changes) = changes else {
            debug!(digest = %tx.digest, "Transaction block carries no balance changes");
            return Ok(None);
        };

        for change in &changes {
            if change.coin_type == self.coin_type {
                info!(
                    digest = %tx.digest,
                    coin_type = %change.coin_type,
                    amount = %change.amount,
                    "Signal extracted"
                );
                return Ok(Some(Signal::from(change.amount.as_str())));
            }
        }

        debug!(
            digest = %tx.digest,
            candidates = changes.len(),
            coin_type = %self.coin_type,
            "No balance change matches watched coin type"
        );
        Ok(None)
    }

    /// Render a ledger `timestampMs` string for log output.
    fn format_timestamp(timestamp_ms: Option<&str>) -> String {
        timestamp_ms
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|dt: DateTime<Utc>| dt.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
