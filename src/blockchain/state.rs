//! Read-only chain state the sweep loop depends on.
//!
//! The orchestrator and resolution wait are generic over [`ChainState`] so
//! they can run against an in-memory chain in tests.

use std::future::Future;

use alloy::primitives::{Address, TxHash};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::BlockchainResult;

/// Chain queries needed to plan a bundle and decide its fate.
pub trait ChainState: Send + Sync {
    /// Latest block number.
    fn block_number(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Transaction count (next nonce) of `address` at the latest block.
    fn transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Hashes of the transactions in block `number`, if the node has it.
    fn block_transactions(
        &self,
        number: u64,
    ) -> impl Future<Output = BlockchainResult<Option<Vec<TxHash>>>> + Send;
}

impl ChainState for BlockchainClient {
    async fn block_number(&self) -> BlockchainResult<u64> {
        self.get_block_number().await
    }

    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.get_transaction_count(address).await
    }

    async fn block_transactions(&self, number: u64) -> BlockchainResult<Option<Vec<TxHash>>> {
        self.get_block_transaction_hashes(number).await
    }
}
