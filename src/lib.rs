//! PROSPECTOR — Autonomous On-Chain Mining Trigger Agent
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod retry;
pub mod ledger;
pub mod wallet;
pub mod miner;
pub mod engine;
