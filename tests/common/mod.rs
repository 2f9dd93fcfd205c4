//! Shared fakes for integration tests.
//!
//! `FakeChain` is an in-memory node. `FakeRelay` records every bundle it sees
//! and, on submission, mutates the chain according to a per-cycle script.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, TxHash, B256};
use asset_sweeper::blockchain::{BlockchainError, BlockchainResult, ChainState, Wallet};
use asset_sweeper::config::{AssetConfig, SweepConfig};
use asset_sweeper::relay::{
    BundleReceipt, BundleRelay, RelayError, RelayResult, SignedBundle, SimulationReport,
    TxSimulation,
};
use asset_sweeper::sweep::{Orchestrator, ResolutionOptions, SweepPlan};

/// Anvil account 0.
pub const SPONSOR_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Anvil account 1.
pub const COMPROMISED_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

#[derive(Default)]
struct ChainInner {
    head: u64,
    nonces: HashMap<Address, u64>,
    blocks: HashMap<u64, Vec<TxHash>>,
    fail_nonce_reads: bool,
}

/// In-memory chain state.
#[derive(Clone, Default)]
pub struct FakeChain {
    inner: Arc<Mutex<ChainInner>>,
}

impl FakeChain {
    pub fn new(head: u64) -> Self {
        let chain = Self::default();
        chain.inner.lock().unwrap().head = head;
        chain
    }

    pub fn head(&self) -> u64 {
        self.inner.lock().unwrap().head
    }

    pub fn set_head(&self, head: u64) {
        self.inner.lock().unwrap().head = head;
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.inner.lock().unwrap().nonces.insert(address, nonce);
    }

    pub fn nonce(&self, address: Address) -> u64 {
        *self.inner.lock().unwrap().nonces.get(&address).unwrap_or(&0)
    }

    pub fn bump_nonce(&self, address: Address) {
        *self.inner.lock().unwrap().nonces.entry(address).or_insert(0) += 1;
    }

    pub fn fail_nonce_reads(&self) {
        self.inner.lock().unwrap().fail_nonce_reads = true;
    }

    /// Produce block `number` containing `hashes` and make it the head.
    pub fn produce_block(&self, number: u64, hashes: Vec<TxHash>) {
        let mut inner = self.inner.lock().unwrap();
        inner.blocks.insert(number, hashes);
        inner.head = inner.head.max(number);
    }

    /// Land `bundle` in its target block and advance every origin nonce.
    pub fn include(&self, bundle: &SignedBundle) {
        {
            let mut inner = self.inner.lock().unwrap();
            for tx in &bundle.transactions {
                let nonce = inner.nonces.entry(tx.from).or_insert(0);
                *nonce = (*nonce).max(tx.nonce + 1);
            }
        }
        self.produce_block(bundle.target_block, bundle.hashes());
    }
}

impl ChainState for FakeChain {
    async fn block_number(&self) -> BlockchainResult<u64> {
        Ok(self.head())
    }

    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_nonce_reads {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(*inner.nonces.get(&address).unwrap_or(&0))
    }

    async fn block_transactions(&self, number: u64) -> BlockchainResult<Option<Vec<TxHash>>> {
        Ok(self.inner.lock().unwrap().blocks.get(&number).cloned())
    }
}

/// What the relay does with the bundle of one cycle.
#[derive(Debug, Clone)]
pub enum Script {
    /// Bundle lands in its target block.
    Include,
    /// Target block is produced without the bundle.
    Miss,
    /// Target block is produced without the bundle and `Address` sent one
    /// more transaction in it.
    MissAndBump(Address),
    /// Nothing observable happens; the resolution wait runs out.
    Stall,
    /// `Address` gets a transaction mined before the target block.
    FrontRun(Address),
    /// `eth_callBundle` returns a JSON-RPC error.
    RejectSimulation,
    /// `eth_callBundle` succeeds but the last transaction reverts.
    RevertInSimulation,
    /// `eth_sendBundle` returns a JSON-RPC error.
    RejectSend,
    /// `eth_sendBundle` fails at the transport level.
    DropConnection,
}

/// Scripted relay.
pub struct FakeRelay {
    chain: FakeChain,
    script: Mutex<VecDeque<Script>>,
    current: Mutex<Option<Script>>,
    simulated: Mutex<Vec<SignedBundle>>,
    sent: Mutex<Vec<SignedBundle>>,
}

impl FakeRelay {
    pub fn new(chain: FakeChain, script: Vec<Script>) -> Self {
        Self {
            chain,
            script: Mutex::new(script.into()),
            current: Mutex::new(None),
            simulated: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn simulated(&self) -> Vec<SignedBundle> {
        self.simulated.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<SignedBundle> {
        self.sent.lock().unwrap().clone()
    }
}

impl BundleRelay for FakeRelay {
    async fn simulate(&self, bundle: &SignedBundle) -> RelayResult<SimulationReport> {
        self.simulated.lock().unwrap().push(bundle.clone());
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Script::Miss);
        *self.current.lock().unwrap() = Some(step.clone());

        let mut results: Vec<TxSimulation> = bundle
            .transactions
            .iter()
            .map(|tx| TxSimulation {
                tx_hash: Some(tx.hash),
                gas_used: Some(21_000),
                ..TxSimulation::default()
            })
            .collect();

        match step {
            Script::RejectSimulation => Err(RelayError::Rpc {
                code: -32000,
                message: "err: nonce too low".to_string(),
            }),
            Script::RevertInSimulation => {
                if let Some(last) = results.last_mut() {
                    last.revert = Some("ERC721: caller is not token owner".to_string());
                }
                Ok(SimulationReport {
                    results,
                    ..SimulationReport::default()
                })
            }
            _ => Ok(SimulationReport {
                total_gas_used: Some(21_000 * bundle.transactions.len() as u64),
                results,
                ..SimulationReport::default()
            }),
        }
    }

    async fn send(&self, bundle: &SignedBundle) -> RelayResult<BundleReceipt> {
        self.sent.lock().unwrap().push(bundle.clone());
        let step = self.current.lock().unwrap().take().unwrap_or(Script::Miss);

        match step {
            Script::Include => self.chain.include(bundle),
            Script::Miss => self.chain.produce_block(bundle.target_block, Vec::new()),
            Script::MissAndBump(address) => {
                self.chain.bump_nonce(address);
                self.chain.produce_block(bundle.target_block, vec![B256::repeat_byte(0xee)]);
            }
            Script::FrontRun(address) => self.chain.bump_nonce(address),
            Script::RejectSend => {
                return Err(RelayError::Rpc {
                    code: -32602,
                    message: "invalid bundle".to_string(),
                })
            }
            Script::DropConnection => {
                return Err(RelayError::EmptyResult("eth_sendBundle".to_string()))
            }
            Script::Stall | Script::RejectSimulation | Script::RevertInSimulation => {}
        }

        Ok(BundleReceipt {
            bundle_hash: B256::repeat_byte(0xbb),
        })
    }
}

pub fn sponsor() -> Wallet {
    Wallet::from_private_key(SPONSOR_KEY, 1).unwrap()
}

pub fn compromised() -> Wallet {
    Wallet::from_private_key(COMPROMISED_KEY, 1).unwrap()
}

pub fn fast_resolution() -> ResolutionOptions {
    ResolutionOptions {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_millis(500),
    }
}

/// Config with `counts[i]` token ids in collection `i`.
pub fn config_with_assets(counts: &[usize]) -> SweepConfig {
    let mut config = SweepConfig::default();
    config.assets = counts
        .iter()
        .enumerate()
        .map(|(i, count)| AssetConfig {
            contract: format!("{:?}", Address::with_last_byte(i as u8 + 1)),
            token_ids: (0..*count).map(|id| (100 * (i + 1) + id).to_string()).collect(),
        })
        .collect();
    config
}

/// Orchestrator over the fakes using the default asset list.
pub fn orchestrator(
    chain: FakeChain,
    relay: FakeRelay,
) -> Orchestrator<FakeChain, FakeRelay> {
    orchestrator_with(chain, relay, &SweepConfig::default())
}

pub fn orchestrator_with(
    chain: FakeChain,
    relay: FakeRelay,
    config: &SweepConfig,
) -> Orchestrator<FakeChain, FakeRelay> {
    Orchestrator::new(
        chain,
        relay,
        sponsor(),
        compromised(),
        SweepPlan::from_config(config).unwrap(),
        fast_resolution(),
    )
}
