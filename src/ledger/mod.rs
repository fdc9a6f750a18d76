//! Ledger RPC boundary.
//!
//! Defines the `LedgerRpc` trait — the two read queries the agent needs
//! from the chain — and the wire types they return. The production
//! implementation (`SuiRpcClient`) speaks Sui JSON-RPC over HTTPS;
//! tests substitute scripted fakes.

pub mod sui;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors from a single RPC call.
///
/// All variants are transient from the caller's point of view — the
/// retry wrapper treats them uniformly and surfaces the last one
/// verbatim once attempts are exhausted.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed RPC response: {0}")]
    Decode(String),
}

/// Summary entry from a transaction-block query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub digest: String,
    /// Milliseconds since epoch, as a decimal string. May be absent on
    /// very fresh transactions.
    #[serde(default)]
    pub timestamp_ms: Option<String>,
}

/// One balance-change record from a transaction block.
///
/// The list order is not meaningful; entries are matched by coin type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub coin_type: String,
    /// Signed decimal amount, kept as a string to avoid precision loss.
    pub amount: String,
}

/// Read-only view of the ledger, narrowed to the two queries the
/// trigger engine needs.
///
/// A well-formed response with no data is `Ok(None)`; only transport,
/// HTTP, and protocol failures are errors.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Most recent transaction that used `object_id` as an input,
    /// or `None` if no such transaction exists yet.
    async fn latest_transaction_for_object(
        &self,
        object_id: &str,
    ) -> Result<Option<TransactionSummary>, LedgerError>;

    /// Balance changes recorded by the transaction with `digest`,
    /// or `None` if the block carries no balance-change list.
    async fn balance_changes(
        &self,
        digest: &str,
    ) -> Result<Option<Vec<BalanceChange>>, LedgerError>;
}
