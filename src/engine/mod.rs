//! Core engine — the fetch → compare → mine trigger loop.

pub mod fetcher;
pub mod trigger;
