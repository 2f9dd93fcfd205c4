//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (sponsor key, compromised key)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → state.rs (ChainState seam used by the sweep loop)
//!     → transaction.rs (fully specified EIP-1559 requests)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod state;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use state::ChainState;
pub use types::{BlockchainError, BlockchainResult, ChainId, FeeParams};
pub use wallet::Wallet;
