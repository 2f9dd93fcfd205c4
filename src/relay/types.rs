//! Bundle, simulation and resolution types plus relay errors.

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::BlockchainError;

/// One signed transaction ready for the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    /// Transaction hash.
    pub hash: TxHash,
    /// EIP-2718 encoded bytes.
    pub raw: Bytes,
    /// Origin account.
    pub from: Address,
    /// Nonce used by the origin account.
    pub nonce: u64,
}

impl SignedTransaction {
    /// Capture hash and encoding of a signed envelope.
    pub fn from_envelope(envelope: &TxEnvelope, from: Address, nonce: u64) -> Self {
        Self {
            hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
            from,
            nonce,
        }
    }
}

/// An ordered, all-or-nothing set of signed transactions for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedBundle {
    /// Block the bundle must land in.
    pub target_block: u64,
    /// Transactions in execution order.
    pub transactions: Vec<SignedTransaction>,
}

impl SignedBundle {
    /// Raw encodings in bundle order.
    pub fn raw_transactions(&self) -> Vec<Bytes> {
        self.transactions.iter().map(|tx| tx.raw.clone()).collect()
    }

    /// Hashes in bundle order.
    pub fn hashes(&self) -> Vec<TxHash> {
        self.transactions.iter().map(|tx| tx.hash).collect()
    }

    /// Lowest nonce each origin account uses, in first-appearance order.
    pub fn account_nonces(&self) -> Vec<(Address, u64)> {
        let mut accounts: Vec<(Address, u64)> = Vec::new();
        for tx in &self.transactions {
            match accounts.iter_mut().find(|(address, _)| *address == tx.from) {
                Some((_, nonce)) => *nonce = (*nonce).min(tx.nonce),
                None => accounts.push((tx.from, tx.nonce)),
            }
        }
        accounts
    }
}

/// Per-transaction outcome of `eth_callBundle`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxSimulation {
    pub tx_hash: Option<TxHash>,
    pub gas_used: Option<u64>,
    pub from_address: Option<Address>,
    pub to_address: Option<Address>,
    pub error: Option<String>,
    pub revert: Option<String>,
}

impl TxSimulation {
    /// Error or revert reason, if the transaction failed.
    pub fn failure(&self) -> Option<&str> {
        self.error.as_deref().or(self.revert.as_deref())
    }
}

/// Result of simulating a bundle against a target block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationReport {
    pub bundle_hash: Option<B256>,
    pub bundle_gas_price: Option<String>,
    pub coinbase_diff: Option<String>,
    pub state_block_number: Option<u64>,
    pub total_gas_used: Option<u64>,
    pub results: Vec<TxSimulation>,
}

impl SimulationReport {
    /// First transaction that errored or reverted, with its bundle index.
    pub fn first_failure(&self) -> Option<(usize, &TxSimulation)> {
        self.results
            .iter()
            .enumerate()
            .find(|(_, result)| result.failure().is_some())
    }
}

/// Acknowledgement of `eth_sendBundle`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReceipt {
    pub bundle_hash: B256,
}

/// Outcome of a submitted bundle once its target block is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BundleResolution {
    /// Every bundle transaction landed in the target block.
    BundleIncluded,
    /// The target block was produced without the bundle.
    BlockPassedWithoutInclusion,
    /// An origin account's nonce moved past the bundle before the target block.
    AccountNonceTooHigh,
    /// No decision before the resolution timeout.
    TimedOut,
}

impl BundleResolution {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleResolution::BundleIncluded => "included",
            BundleResolution::BlockPassedWithoutInclusion => "block_passed",
            BundleResolution::AccountNonceTooHigh => "nonce_too_high",
            BundleResolution::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for BundleResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the bundle relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("Relay HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Relay answered with a non-success status.
    #[error("Relay returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Relay response was not valid JSON-RPC.
    #[error("Relay response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Relay returned a JSON-RPC error object.
    #[error("Relay error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// JSON-RPC response carried neither result nor error.
    #[error("Relay response for {0} had no result")]
    EmptyResult(String),

    /// Auth header signing failed.
    #[error("Relay auth signing failed: {0}")]
    Auth(#[from] BlockchainError),

    /// Invalid relay endpoint.
    #[error("Invalid relay URL '{0}'")]
    InvalidUrl(String),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const A: Address = address!("0000000000000000000000000000000000000001");
    const B: Address = address!("0000000000000000000000000000000000000002");

    fn tx(from: Address, nonce: u64) -> SignedTransaction {
        SignedTransaction {
            hash: B256::with_last_byte(nonce as u8),
            raw: Bytes::from(vec![nonce as u8]),
            from,
            nonce,
        }
    }

    #[test]
    fn test_account_nonces_take_lowest() {
        let bundle = SignedBundle {
            target_block: 10,
            transactions: vec![tx(A, 3), tx(B, 7), tx(B, 8), tx(B, 9)],
        };
        assert_eq!(bundle.account_nonces(), vec![(A, 3), (B, 7)]);
        assert_eq!(bundle.hashes().len(), 4);
        assert_eq!(bundle.raw_transactions()[1], Bytes::from(vec![7u8]));
    }

    #[test]
    fn test_simulation_report_parsing() {
        let json = r#"{
            "bundleGasPrice": "50000000000",
            "bundleHash": "0x2ca9c4d2ba00d8144d8e396a4989374443cb20fb490d800f4f883ad4e1b32158",
            "coinbaseDiff": "2100000000000000",
            "stateBlockNumber": 5221585,
            "totalGasUsed": 71000,
            "results": [
                {"txHash": "0x0000000000000000000000000000000000000000000000000000000000000001", "gasUsed": 21000},
                {"txHash": "0x0000000000000000000000000000000000000000000000000000000000000002", "gasUsed": 50000, "revert": "ERC721: caller is not token owner"}
            ]
        }"#;
        let report: SimulationReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.total_gas_used, Some(71000));
        assert_eq!(report.results.len(), 2);

        let (index, failed) = report.first_failure().unwrap();
        assert_eq!(index, 1);
        assert_eq!(failed.failure(), Some("ERC721: caller is not token owner"));
    }

    #[test]
    fn test_clean_simulation_has_no_failure() {
        let report: SimulationReport =
            serde_json::from_str(r#"{"results": [{"gasUsed": 21000}]}"#).unwrap();
        assert!(report.first_failure().is_none());
    }

    #[test]
    fn test_resolution_labels() {
        assert_eq!(BundleResolution::BundleIncluded.to_string(), "included");
        assert_eq!(BundleResolution::AccountNonceTooHigh.as_str(), "nonce_too_high");
    }
}
