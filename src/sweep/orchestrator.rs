//! Sweep orchestrator: one bundle attempt per observed block.
//!
//! # Cycle
//! ```text
//! block h observed
//!     → read compromised nonce, plan transfers
//!     → read sponsor nonce, plan funding
//!     → sign [funding, transfers...] for block h + 1
//!     → simulate (relay rejection: abort cycle)
//!     → send     (relay rejection: abort cycle)
//!     → wait for resolution
//! ```
//!
//! Cycles are serialized: the run loop finishes one before taking the next
//! block height, and skips heights that queued up in the meantime.

use std::time::Instant;

use tokio::sync::{broadcast, mpsc};
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::{ChainState, Wallet};
use crate::observability::metrics;
use crate::relay::{BundleRelay, BundleResolution, RelayError, SignedBundle, SimulationReport};
use crate::sweep::bundle::{sign_bundle, BundlePlan, SweepPlan};
use crate::sweep::error::SweepResult;
use crate::sweep::resolution::{wait_for_resolution, ResolutionOptions};

/// Outcome of a single attempt cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The bundle was submitted and its target block decided.
    Resolved {
        target_block: u64,
        resolution: BundleResolution,
    },
    /// The relay rejected the simulation; nothing was submitted.
    SimulationFailed { target_block: u64, reason: String },
    /// The relay rejected the submission.
    SubmissionFailed { target_block: u64, reason: String },
}

/// Why the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepExit {
    /// The bundle landed in `block`.
    Included { block: u64 },
    /// An account nonce moved past the bundle; retrying cannot help.
    NonceConflict,
    /// Shutdown was signalled.
    Shutdown,
    /// The block source closed.
    StreamClosed,
}

/// Result of a one-off simulation.
#[derive(Debug, Clone)]
pub enum SimulationVerdict {
    Passed(SimulationReport),
    Rejected(String),
}

/// Drives bundle attempts against a chain and a relay.
pub struct Orchestrator<C, R> {
    chain: C,
    relay: R,
    sponsor: Wallet,
    compromised: Wallet,
    plan: SweepPlan,
    resolution: ResolutionOptions,
}

impl<C: ChainState, R: BundleRelay> Orchestrator<C, R> {
    pub fn new(
        chain: C,
        relay: R,
        sponsor: Wallet,
        compromised: Wallet,
        plan: SweepPlan,
        resolution: ResolutionOptions,
    ) -> Self {
        Self {
            chain,
            relay,
            sponsor,
            compromised,
            plan,
            resolution,
        }
    }

    pub fn sponsor(&self) -> &Wallet {
        &self.sponsor
    }

    pub fn compromised(&self) -> &Wallet {
        &self.compromised
    }

    pub fn sweep_plan(&self) -> &SweepPlan {
        &self.plan
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// Read both nonces and lay out the bundle targeting `observed_block + 1`.
    pub async fn plan_bundle(&self, observed_block: u64) -> SweepResult<BundlePlan> {
        let compromised_nonce = self.chain.transaction_count(self.compromised.address()).await?;
        tracing::info!(nonce = compromised_nonce, "Compromised nonce");

        let sponsor_nonce = self.chain.transaction_count(self.sponsor.address()).await?;
        tracing::debug!(nonce = sponsor_nonce, "Sponsor nonce");

        Ok(self.plan.plan(
            self.sponsor.address(),
            self.compromised.address(),
            sponsor_nonce,
            compromised_nonce,
            observed_block + 1,
        ))
    }

    /// Plan and sign the bundle targeting `observed_block + 1`.
    pub async fn build_bundle(&self, observed_block: u64) -> SweepResult<SignedBundle> {
        let plan = self.plan_bundle(observed_block).await?;
        let bundle = sign_bundle(&plan, &self.sponsor, &self.compromised).await?;
        tracing::debug!(
            hashes = ?bundle.hashes(),
            "Signed bundle"
        );
        Ok(bundle)
    }

    /// Simulate a signed bundle, separating relay rejections from failures.
    pub async fn simulate(&self, bundle: &SignedBundle) -> SweepResult<SimulationVerdict> {
        match self.relay.simulate(bundle).await {
            Ok(report) => match report.first_failure() {
                Some((index, result)) => Ok(SimulationVerdict::Rejected(format!(
                    "transaction {} failed: {}",
                    index,
                    result.failure().unwrap_or_default()
                ))),
                None => Ok(SimulationVerdict::Passed(report)),
            },
            Err(e) if is_rejection(&e) => Ok(SimulationVerdict::Rejected(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// One attempt for the block just observed.
    pub async fn run_cycle(&self, observed_block: u64) -> SweepResult<CycleOutcome> {
        let span = tracing::info_span!(
            "cycle",
            cycle_id = %Uuid::new_v4(),
            block = observed_block,
            target_block = observed_block + 1
        );
        let start = Instant::now();
        let outcome = self.attempt(observed_block).instrument(span).await;
        metrics::record_cycle(start);
        outcome
    }

    async fn attempt(&self, observed_block: u64) -> SweepResult<CycleOutcome> {
        tracing::info!("Current block: {}", observed_block);
        let bundle = self.build_bundle(observed_block).await?;
        let target_block = bundle.target_block;

        match self.simulate(&bundle).await? {
            SimulationVerdict::Passed(report) => {
                tracing::info!(
                    total_gas_used = report.total_gas_used,
                    coinbase_diff = report.coinbase_diff.as_deref().unwrap_or("unknown"),
                    "Simulation successful. Sending bundle."
                );
            }
            SimulationVerdict::Rejected(reason) => {
                tracing::error!(reason = %reason, "Simulation error");
                metrics::record_simulation_failure();
                return Ok(CycleOutcome::SimulationFailed {
                    target_block,
                    reason,
                });
            }
        }

        match self.relay.send(&bundle).await {
            Ok(receipt) => {
                metrics::record_bundle_submitted();
                tracing::info!(
                    bundle_hash = %receipt.bundle_hash,
                    "Bundle sent, waiting for inclusion in block {}",
                    target_block
                );
            }
            Err(e) if is_rejection(&e) => {
                tracing::error!(error = %e, "Error sending bundle");
                metrics::record_submission_failure();
                return Ok(CycleOutcome::SubmissionFailed {
                    target_block,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        let resolution = wait_for_resolution(&self.chain, &bundle, self.resolution).await?;
        metrics::record_resolution(resolution);

        match resolution {
            BundleResolution::BundleIncluded => {
                tracing::info!("Success: Bundle included in block {}", target_block);
            }
            BundleResolution::BlockPassedWithoutInclusion => {
                tracing::warn!("Bundle not included in block {}", target_block);
            }
            BundleResolution::AccountNonceTooHigh => {
                tracing::error!("Nonce too high, giving up");
            }
            other => {
                tracing::error!(resolution = %other, "Unexpected resolution");
            }
        }

        Ok(CycleOutcome::Resolved {
            target_block,
            resolution,
        })
    }

    /// Consume block heights until the bundle lands or a fatal condition.
    pub async fn run(
        &self,
        mut blocks: mpsc::Receiver<u64>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> SweepResult<SweepExit> {
        tracing::info!(
            sponsor = %self.sponsor.address(),
            compromised = %self.compromised.address(),
            receiver = %self.plan.receiver,
            transfers = self.plan.transfer_count(),
            "Sweep loop started"
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.recv() => return Ok(SweepExit::Shutdown),
                next = blocks.recv() => next,
            };
            let observed = match next {
                Some(block) => latest_queued(&mut blocks, block),
                None => return Ok(SweepExit::StreamClosed),
            };

            let outcome = tokio::select! {
                biased;
                _ = shutdown.recv() => return Ok(SweepExit::Shutdown),
                outcome = self.run_cycle(observed) => outcome?,
            };

            if let CycleOutcome::Resolved { target_block, resolution } = outcome {
                match resolution {
                    BundleResolution::BundleIncluded => {
                        return Ok(SweepExit::Included { block: target_block });
                    }
                    BundleResolution::AccountNonceTooHigh => return Ok(SweepExit::NonceConflict),
                    BundleResolution::BlockPassedWithoutInclusion | BundleResolution::TimedOut => {}
                }
            }
        }
    }
}

/// Relay errors the relay itself reported, as opposed to transport failures.
fn is_rejection(error: &RelayError) -> bool {
    matches!(error, RelayError::Rpc { .. } | RelayError::Status { .. })
}

/// Drain heights that arrived during the previous cycle, keeping the newest.
fn latest_queued(blocks: &mut mpsc::Receiver<u64>, mut latest: u64) -> u64 {
    while let Ok(next) = blocks.try_recv() {
        if next > latest {
            tracing::debug!(skipped = latest, "Skipping stale block");
            latest = next;
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_latest_queued_keeps_newest() {
        let (tx, mut rx) = mpsc::channel(8);
        for block in [11, 12, 13] {
            tx.send(block).await.unwrap();
        }
        assert_eq!(latest_queued(&mut rx, 10), 13);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rejection_classification() {
        assert!(is_rejection(&RelayError::Rpc {
            code: -32000,
            message: "bundle reverted".to_string()
        }));
        assert!(is_rejection(&RelayError::Status {
            status: 400,
            body: String::new()
        }));
        assert!(!is_rejection(&RelayError::EmptyResult("eth_sendBundle".to_string())));
    }
}
