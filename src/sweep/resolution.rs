//! Waiting for a submitted bundle's fate.
//!
//! Before the target block: an origin account whose on-chain nonce already
//! passed the bundle's nonce means the bundle can never land.
//! At or after the target block: the bundle is included iff every one of its
//! transaction hashes is in the target block.

use std::time::Duration;

use alloy::primitives::Address;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::{BlockchainResult, ChainState};
use crate::relay::{BundleResolution, SignedBundle};

/// Polling cadence and upper bound of a resolution wait.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Poll the chain until `bundle` resolves or the timeout expires.
pub async fn wait_for_resolution<C: ChainState>(
    chain: &C,
    bundle: &SignedBundle,
    options: ResolutionOptions,
) -> BlockchainResult<BundleResolution> {
    let polling = poll_until_resolved(chain, bundle, options.poll_interval);
    match timeout(options.timeout, polling).await {
        Ok(resolution) => resolution,
        Err(_) => Ok(BundleResolution::TimedOut),
    }
}

async fn poll_until_resolved<C: ChainState>(
    chain: &C,
    bundle: &SignedBundle,
    poll_interval: Duration,
) -> BlockchainResult<BundleResolution> {
    let target = bundle.target_block;
    let accounts = bundle.account_nonces();
    let hashes = bundle.hashes();

    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let head = chain.block_number().await?;
        if head < target {
            // The head may reach the target while nonces are read; in that
            // case the inclusion check decides.
            if nonce_passed(chain, &accounts).await? && chain.block_number().await? < target {
                return Ok(BundleResolution::AccountNonceTooHigh);
            }
            continue;
        }

        match chain.block_transactions(target).await? {
            Some(included) => {
                let all_included = hashes.iter().all(|hash| included.contains(hash));
                return Ok(if all_included {
                    BundleResolution::BundleIncluded
                } else {
                    BundleResolution::BlockPassedWithoutInclusion
                });
            }
            None => {
                tracing::debug!(
                    target_block = target,
                    head = head,
                    "Target block not available yet"
                );
            }
        }
    }
}

async fn nonce_passed<C: ChainState>(
    chain: &C,
    accounts: &[(Address, u64)],
) -> BlockchainResult<bool> {
    for (address, nonce) in accounts {
        let count = chain.transaction_count(*address).await?;
        if count > *nonce {
            tracing::debug!(
                address = %address,
                bundle_nonce = nonce,
                chain_nonce = count,
                "Account nonce moved past bundle"
            );
            return Ok(true);
        }
    }
    Ok(false)
}
