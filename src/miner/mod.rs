//! Mining targets.
//!
//! Defines the `MiningTarget` trait — the narrow capability the trigger
//! loop invokes when the watched signal matches — and the two concrete
//! miner kinds the agent supports:
//! - Meta — block-store/treasury miner
//! - FOMO — bus-based miner with round-robin bus selection

pub mod fomo;
pub mod meta;

use anyhow::Result;
use async_trait::async_trait;

/// Abstraction over a mining capability.
///
/// `mine()` prepares and submits one mining transaction. Everything
/// below the call — transaction building, signing, consensus — is the
/// implementor's concern; the trigger loop only sees success/failure
/// and must survive either.
#[async_trait]
pub trait MiningTarget: Send + Sync {
    /// Submit one mining transaction.
    async fn mine(&self) -> Result<()>;

    /// Target name for logging and identification.
    fn name(&self) -> &str;
}
