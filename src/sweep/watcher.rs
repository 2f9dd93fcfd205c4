//! Block height watcher.
//!
//! Polls the node and forwards every new, strictly higher block height to the
//! sweep loop. Transport errors are logged and polling continues.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::blockchain::ChainState;
use crate::observability::metrics;

/// Polling producer of block heights.
pub struct BlockWatcher<C> {
    chain: C,
    poll_interval: Duration,
}

impl<C: ChainState + 'static> BlockWatcher<C> {
    pub fn new(chain: C, poll_interval: Duration) -> Self {
        Self {
            chain,
            poll_interval,
        }
    }

    /// Spawn the watcher and return the receiving end of its channel.
    pub fn spawn(
        self,
        capacity: usize,
        shutdown: broadcast::Receiver<()>,
    ) -> (mpsc::Receiver<u64>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(self.run(tx, shutdown));
        (rx, handle)
    }

    /// Poll until shutdown or until the receiver is dropped.
    pub async fn run(self, tx: mpsc::Sender<u64>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_seen: Option<u64> = None;

        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Block watcher started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Block watcher stopping");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.chain.block_number().await {
                Ok(number) if last_seen.map_or(true, |last| number > last) => {
                    last_seen = Some(number);
                    metrics::record_observed_block(number);
                    tracing::debug!(block = number, "New block");
                    if tx.send(number).await.is_err() {
                        tracing::debug!("Block receiver dropped, watcher exiting");
                        return;
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Failed to poll block number"),
            }
        }
    }
}
