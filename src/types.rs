//! Shared types for the PROSPECTOR agent.
//!
//! These types form the data model used across the ledger, engine,
//! and miner modules so they can depend on them without circular
//! references.

use std::fmt;

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// A balance-change amount extracted from ledger state.
///
/// Kept as the exact decimal string the RPC returned — amounts can exceed
/// what fits losslessly in an `f64`, and the trigger decision is a plain
/// equality check, so no numeric parsing is ever needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal(String);

impl Signal {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Signal {
    fn from(s: String) -> Self {
        Signal(s)
    }
}

impl From<&str> for Signal {
    fn from(s: &str) -> Self {
        Signal(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// MineCall
// ---------------------------------------------------------------------------

/// A prepared Move call for one mining submission.
///
/// Built by a miner, handed to the wallet session for signing and
/// execution. Arguments are kept as raw JSON values since each miner
/// kind has its own argument shape.
#[derive(Debug, Clone)]
pub struct MineCall {
    pub package_id: String,
    pub module: String,
    pub function: String,
    pub arguments: Vec<serde_json::Value>,
}

impl fmt::Display for MineCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}({} args)",
            self.package_id,
            self.module,
            self.function,
            self.arguments.len()
        )
    }
}
