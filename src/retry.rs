//! Bounded retry with fixed inter-attempt delay.
//!
//! Every network call in the agent goes through [`call_with_retry`] —
//! it is the single point of fault tolerance for transient RPC errors.
//! The delay is a plain `tokio::time::sleep`, so other trigger loops
//! keep running while one call site waits out a flaky endpoint.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Immutable retry configuration attached to a call site.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be >= 1.
    pub max_attempts: u32,
    /// Fixed wait between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Execute `op` up to `policy.max_attempts` times.
///
/// Returns the first success immediately. Intermediate failures are
/// logged and followed by a fixed delay; the error from the final
/// attempt is returned verbatim so callers see exactly what the last
/// try saw. With `max_attempts == 1` this is a single unretried call.
pub async fn call_with_retry<T, E, F, Fut>(op: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying after delay"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    unreachable!("retry loop always returns from its final attempt")
}
