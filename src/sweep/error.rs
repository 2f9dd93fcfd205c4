//! Sweep loop errors.

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::relay::RelayError;

/// Errors that end a sweep run.
///
/// Relay rejections of a simulation or submission are not errors; they abort
/// the cycle and the next block retries.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Invalid sweep parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for sweep operations.
pub type SweepResult<T> = Result<T, SweepError>;
