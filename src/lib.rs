//! Atomic asset recovery for compromised Ethereum accounts.
//!
//! Each observed block, a sponsor-funded bundle of ERC-721 transfers is
//! signed, simulated and submitted to a bundle relay for the next block, so
//! the transfers either all land together or not at all.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod sweep;

pub use config::schema::SweepConfig;
pub use lifecycle::Shutdown;
pub use sweep::{Orchestrator, SweepExit};
