//! Bundle relay subsystem.
//!
//! # Data Flow
//! ```text
//! SignedBundle
//!     → client.rs (JSON-RPC body, X-Flashbots-Signature)
//!     → eth_callBundle  → SimulationReport
//!     → eth_sendBundle  → BundleReceipt
//! ```
//!
//! The relay never sees the account keys; requests are authenticated by an
//! ephemeral key generated at startup.

use std::future::Future;

pub mod client;
pub mod types;

pub use client::RelayClient;
pub use types::{
    BundleReceipt, BundleResolution, RelayError, RelayResult, SignedBundle, SignedTransaction,
    SimulationReport, TxSimulation,
};

/// Operations the sweep loop needs from a bundle relay.
pub trait BundleRelay: Send + Sync {
    /// Simulate `bundle` against its target block.
    fn simulate(
        &self,
        bundle: &SignedBundle,
    ) -> impl Future<Output = RelayResult<SimulationReport>> + Send;

    /// Submit `bundle` for inclusion in its target block.
    fn send(
        &self,
        bundle: &SignedBundle,
    ) -> impl Future<Output = RelayResult<BundleReceipt>> + Send;
}
