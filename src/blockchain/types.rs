//! Chain-specific types and error definitions.

use alloy::primitives::U256;
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// A transaction request could not be turned into a signed envelope.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// EIP-1559 fee parameters shared by every transaction in a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    /// Max fee per gas in wei.
    pub max_fee_per_gas: u128,
    /// Max priority fee per gas in wei.
    pub max_priority_fee_per_gas: u128,
    /// Gas limit.
    pub gas_limit: u64,
}

impl FeeParams {
    /// Build fee parameters from gwei amounts.
    pub fn from_gwei(max_fee_gwei: u64, max_priority_fee_gwei: u64, gas_limit: u64) -> Self {
        Self {
            max_fee_per_gas: gwei_to_wei(max_fee_gwei),
            max_priority_fee_per_gas: gwei_to_wei(max_priority_fee_gwei),
            gas_limit,
        }
    }

    /// Same fees with a different gas limit.
    pub fn with_gas_limit(self, gas_limit: u64) -> Self {
        Self { gas_limit, ..self }
    }

    /// Worst-case cost of one transaction using these parameters.
    pub fn max_cost(&self) -> U256 {
        U256::from(self.max_fee_per_gas) * U256::from(self.gas_limit)
    }
}

fn gwei_to_wei(gwei: u64) -> u128 {
    gwei as u128 * 1_000_000_000
}
