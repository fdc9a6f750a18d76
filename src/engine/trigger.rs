//! The per-target trigger loop.
//!
//! Fetch the current signal, mine when it equals the expected amount,
//! sleep the fixed cadence, repeat — forever. Every failure inside an
//! iteration (fetch, comparison, or the mine call itself) is absorbed
//! and logged at the loop boundary so the cadence always holds; the
//! loop only stops when its task is dropped at process shutdown.
//!
//! One loop runs per enabled mining target. Loops share nothing mutable
//! and never coordinate timing.

use anyhow::Result;
use std::time::Duration;
use tracing::{error, info};

use super::fetcher::SignalFetcher;
use crate::miner::MiningTarget;
use crate::types::Signal;

pub struct TriggerLoop {
    fetcher: SignalFetcher,
    miner: Box<dyn MiningTarget>,
    /// The amount that triggers mining.
    expected: Signal,
    /// Pause between iterations.
    interval: Duration,
    /// Last signal seen on a match. Log-only state: mining fires on a
    /// match whether or not the signal changed.
    last_observed: Option<Signal>,
}

impl TriggerLoop {
    pub fn new(
        fetcher: SignalFetcher,
        miner: Box<dyn MiningTarget>,
        expected: Signal,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            miner,
            expected,
            interval,
            last_observed: None,
        }
    }

    /// Run forever. Never returns; the surrounding task is simply
    /// dropped when the process shuts down.
    pub async fn run(mut self) {
        info!(
            target = self.miner.name(),
            expected = %self.expected,
            interval_ms = self.interval.as_millis() as u64,
            "Trigger loop running"
        );

        loop {
            if let Err(e) = self.run_iteration().await {
                error!(
                    target = self.miner.name(),
                    error = %e,
                    "Iteration failed, holding cadence"
                );
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One fetch → compare → mine pass.
    ///
    /// Errors propagate to [`run`], where they are logged and absorbed.
    async fn run_iteration(&mut self) -> Result<()> {
        match self.fetcher.fetch_signal().await? {
            Some(signal) if signal == self.expected => {
                let changed = self.last_observed.as_ref() != Some(&signal);
                if changed {
                    info!(
                        target = self.miner.name(),
                        signal = %signal,
                        "Expected signal observed (changed)"
                    );
                } else {
                    info!(
                        target = self.miner.name(),
                        signal = %signal,
                        "Expected signal unchanged, mining again"
                    );
                }
                self.last_observed = Some(signal);

                // Mining fires on both branches above — the
                // changed/unchanged distinction is informational only.
                self.miner.mine().await?;
                info!(target = self.miner.name(), "Mine call submitted");
            }
            Some(signal) => {
                info!(
                    target = self.miner.name(),
                    observed = %signal,
                    expected = %self.expected,
                    "Signal does not match, waiting for next check"
                );
            }
            None => {
                info!(target = self.miner.name(), "No signal this cycle");
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{BalanceChange, LedgerError, LedgerRpc, TransactionSummary};
    use crate::retry::RetryPolicy;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const COIN: &str = "0xa340::fomo::FOMO";
    const EXPECTED: &str = "2966979980";

    mock! {
        pub Miner {}

        #[async_trait]
        impl MiningTarget for Miner {
            async fn mine(&self) -> Result<()>;
            fn name(&self) -> &str;
        }
    }

    /// Ledger that always reports the same balance-change amount,
    /// or always fails when `amount` is `None`.
    struct FixedLedger {
        amount: Option<String>,
        query_calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl LedgerRpc for FixedLedger {
        async fn latest_transaction_for_object(
            &self,
            _object_id: &str,
        ) -> Result<Option<TransactionSummary>, LedgerError> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            match &self.amount {
                Some(_) => Ok(Some(TransactionSummary {
                    digest: "AbC123".to_string(),
                    timestamp_ms: None,
                })),
                None => Err(LedgerError::Rpc {
                    code: -32000,
                    message: "node down".into(),
                }),
            }
        }

        async fn balance_changes(
            &self,
            _digest: &str,
        ) -> Result<Option<Vec<BalanceChange>>, LedgerError> {
            match &self.amount {
                Some(amount) => Ok(Some(vec![BalanceChange {
                    coin_type: COIN.to_string(),
                    amount: amount.clone(),
                }])),
                None => Err(LedgerError::Rpc {
                    code: -32000,
                    message: "node down".into(),
                }),
            }
        }
    }

    fn fetcher_for(amount: Option<&str>) -> SignalFetcher {
        fetcher_with_counter(amount, Arc::new(AtomicU32::new(0)))
    }

    fn fetcher_with_counter(amount: Option<&str>, query_calls: Arc<AtomicU32>) -> SignalFetcher {
        SignalFetcher::new(
            Arc::new(FixedLedger {
                amount: amount.map(String::from),
                query_calls,
            }),
            "0xa340".to_string(),
            COIN.to_string(),
            RetryPolicy::new(1, Duration::from_millis(0)),
        )
    }

    fn trigger_loop(amount: Option<&str>, miner: MockMiner) -> TriggerLoop {
        TriggerLoop::new(
            fetcher_for(amount),
            Box::new(miner),
            Signal::from(EXPECTED),
            Duration::from_millis(3500),
        )
    }

    #[tokio::test]
    async fn test_matching_signal_mines_unconditionally() {
        let mut miner = MockMiner::new();
        miner.expect_name().return_const("mock".to_string());
        // Same amount twice in a row — mining must fire both times.
        miner.expect_mine().times(2).returning(|| Ok(()));

        let mut lp = trigger_loop(Some(EXPECTED), miner);
        lp.run_iteration().await.unwrap();
        assert_eq!(lp.last_observed, Some(Signal::from(EXPECTED)));
        lp.run_iteration().await.unwrap();
    }

    #[tokio::test]
    async fn test_non_matching_signal_never_mines() {
        let mut miner = MockMiner::new();
        miner.expect_name().return_const("mock".to_string());
        miner.expect_mine().never();

        let mut lp = trigger_loop(Some("100"), miner);
        lp.run_iteration().await.unwrap();
        assert_eq!(lp.last_observed, None);
    }

    #[tokio::test]
    async fn test_no_signal_never_mines() {
        let mut miner = MockMiner::new();
        miner.expect_name().return_const("mock".to_string());
        miner.expect_mine().never();

        // Ledger answers, but with a coin type we don't watch.
        let fetcher = SignalFetcher::new(
            Arc::new(FixedLedger {
                amount: Some("42".to_string()),
                query_calls: Arc::new(AtomicU32::new(0)),
            }),
            "0xa340".to_string(),
            "0xother::coin::COIN".to_string(),
            RetryPolicy::new(1, Duration::from_millis(0)),
        );
        let mut lp = TriggerLoop::new(
            fetcher,
            Box::new(miner),
            Signal::from(EXPECTED),
            Duration::from_millis(3500),
        );

        lp.run_iteration().await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_without_mining() {
        let mut miner = MockMiner::new();
        miner.expect_name().return_const("mock".to_string());
        miner.expect_mine().never();

        let mut lp = trigger_loop(None, miner);
        let result = lp.run_iteration().await;
        assert!(result.is_err());
        assert_eq!(lp.last_observed, None);
    }

    #[tokio::test]
    async fn test_mine_failure_propagates_after_state_update() {
        let mut miner = MockMiner::new();
        miner.expect_name().return_const("mock".to_string());
        miner
            .expect_mine()
            .times(1)
            .returning(|| Err(anyhow!("gas exhausted")));

        let mut lp = trigger_loop(Some(EXPECTED), miner);
        let result = lp.run_iteration().await;
        assert!(result.is_err());
        // The observation stands even though submission failed.
        assert_eq!(lp.last_observed, Some(Signal::from(EXPECTED)));
    }

    /// Miner whose calls are countable from outside a spawned loop.
    struct CountingMiner {
        calls: Arc<AtomicU32>,
        fail: bool,
    }

    #[async_trait]
    impl MiningTarget for CountingMiner {
        async fn mine(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(anyhow!("gas exhausted"))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_absorbs_mining_failures_and_keeps_cadence() {
        let calls = Arc::new(AtomicU32::new(0));
        let miner = CountingMiner {
            calls: calls.clone(),
            fail: true,
        };

        let lp = TriggerLoop::new(
            fetcher_for(Some(EXPECTED)),
            Box::new(miner),
            Signal::from(EXPECTED),
            Duration::from_millis(3500),
        );

        let handle = tokio::spawn(lp.run());
        // Three full intervals: iterations at 0, 3500, 7000, 10500 ms.
        tokio::time::sleep(Duration::from_millis(3 * 3500 + 100)).await;
        handle.abort();

        // Every mine call failed, yet the loop kept its schedule.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_absorbs_fetch_failures_and_keeps_cadence() {
        let calls = Arc::new(AtomicU32::new(0));
        let miner = CountingMiner {
            calls: calls.clone(),
            fail: false,
        };

        let queries = Arc::new(AtomicU32::new(0));
        let lp = TriggerLoop::new(
            fetcher_with_counter(None, queries.clone()), // every fetch errors out
            Box::new(miner),
            Signal::from(EXPECTED),
            Duration::from_millis(3500),
        );

        let handle = tokio::spawn(lp.run());
        tokio::time::sleep(Duration::from_millis(3 * 3500 + 100)).await;
        handle.abort();

        // Fetch failures never reach the miner, and the loop kept
        // polling on schedule despite them.
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(queries.load(Ordering::SeqCst), 4);
    }
}
