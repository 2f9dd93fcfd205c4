//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the RPC client, wallets, relay client and sweep plan
//! - Check the node serves the configured chain
//! - Start the block watcher and hand its channel to the sweep loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The relay auth key is generated here and never persisted

use std::time::Duration;

use crate::blockchain::{BlockchainClient, BlockchainError, Wallet};
use crate::config::{Secrets, SweepConfig};
use crate::lifecycle::Shutdown;
use crate::relay::RelayClient;
use crate::sweep::{
    BlockWatcher, Orchestrator, ResolutionOptions, SweepExit, SweepPlan, SweepResult,
};

/// Capacity of the block height channel between watcher and sweep loop.
pub const BLOCK_CHANNEL_CAPACITY: usize = 64;

/// Orchestrator wired to a live node and relay.
pub type LiveOrchestrator = Orchestrator<BlockchainClient, RelayClient>;

/// Wire every collaborator from configuration and secrets.
pub fn build_orchestrator(
    config: &SweepConfig,
    secrets: &Secrets,
) -> SweepResult<LiveOrchestrator> {
    let chain_id = config.rpc.chain_id;

    let client = BlockchainClient::new(config.rpc.clone())?;
    let sponsor = Wallet::from_private_key(&secrets.sponsor_key, chain_id)?;
    let compromised = Wallet::from_private_key(&secrets.compromised_key, chain_id)?;
    let relay = RelayClient::new(&config.relay, Wallet::ephemeral(chain_id)?)?;
    let plan = SweepPlan::from_config(config)?;

    let resolution = ResolutionOptions {
        poll_interval: Duration::from_millis(config.rpc.poll_interval_ms),
        timeout: Duration::from_secs(config.relay.resolution_timeout_secs),
    };

    Ok(Orchestrator::new(client, relay, sponsor, compromised, plan, resolution))
}

/// Refuse to sign for the wrong chain; tolerate an unreachable node.
pub async fn check_chain(client: &BlockchainClient) -> SweepResult<()> {
    match client.verify_chain_id().await {
        Ok(()) => Ok(()),
        Err(e @ BlockchainError::ChainMismatch { .. }) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not verify chain ID, continuing");
            Ok(())
        }
    }
}

/// Run the sweep loop until it exits, then stop the watcher.
pub async fn run_sweep(
    orchestrator: &LiveOrchestrator,
    poll_interval: Duration,
    shutdown: &Shutdown,
) -> SweepResult<SweepExit> {
    check_chain(orchestrator.chain()).await?;

    let watcher = BlockWatcher::new(orchestrator.chain().clone(), poll_interval);
    let (blocks, watcher_handle) = watcher.spawn(BLOCK_CHANNEL_CAPACITY, shutdown.subscribe());

    let exit = orchestrator.run(blocks, shutdown.subscribe()).await;

    shutdown.trigger();
    if let Err(e) = watcher_handle.await {
        tracing::warn!(error = %e, "Block watcher task failed");
    }
    exit
}
