//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - Relay authentication uses a throwaway key, never an account key

use alloy::consensus::TxEnvelope;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, B256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use rand::RngCore;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Wallet for transaction and message signing.
#[derive(Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Network wallet used to sign typed transaction requests.
    network: EthereumWallet,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    ///
    /// # Security
    /// The private key is parsed and stored securely. It is never logged.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self::from_signer(signer, chain_id))
    }

    /// Create a wallet around a freshly generated key.
    pub fn ephemeral(chain_id: u64) -> BlockchainResult<Self> {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let signer = PrivateKeySigner::from_bytes(&B256::from(bytes))
            .map_err(|e| BlockchainError::Wallet(format!("Key generation failed: {}", e)))?;
        Ok(Self::from_signer(signer, chain_id))
    }

    fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Self {
        let signer = signer.with_chain_id(Some(chain_id));
        let network = EthereumWallet::from(signer.clone());
        Self {
            signer,
            network,
            chain_id,
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a fully specified transaction request into an envelope.
    pub async fn sign_request(&self, request: TransactionRequest) -> BlockchainResult<TxEnvelope> {
        request
            .with_from(self.address())
            .build(&self.network)
            .await
            .map_err(|e| BlockchainError::Signing(e.to_string()))
    }

    /// Sign arbitrary message bytes (with Ethereum prefix).
    pub async fn sign_message(
        &self,
        message: &[u8],
    ) -> BlockchainResult<alloy::signers::Signature> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Message signing failed: {}", e)))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
