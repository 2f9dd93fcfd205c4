//! Transaction request builders.
//!
//! # Responsibilities
//! - Encode ERC-721 `safeTransferFrom` calls
//! - Build fully specified EIP-1559 requests (no estimation, no RPC)
//!
//! Gas and fees come from configuration; nonces are assigned by the caller.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::types::FeeParams;

sol! {
    /// Minimal ERC-721 surface used to move a token out of the compromised account.
    #[derive(Debug)]
    interface IERC721 {
        function safeTransferFrom(address from, address to, uint256 tokenId);
    }
}

/// Calldata for `safeTransferFrom(from, to, tokenId)`.
pub fn encode_safe_transfer(from: Address, to: Address, token_id: U256) -> Bytes {
    IERC721::safeTransferFromCall {
        from,
        to,
        tokenId: token_id,
    }
    .abi_encode()
    .into()
}

/// Request moving one token from `from` to `to` on `collection`.
pub fn transfer_request(
    collection: Address,
    from: Address,
    to: Address,
    token_id: U256,
    nonce: u64,
    fees: FeeParams,
    chain_id: u64,
) -> TransactionRequest {
    eip1559(fees, nonce, chain_id)
        .with_from(from)
        .with_to(collection)
        .with_input(encode_safe_transfer(from, to, token_id))
}

/// Request sending `value` of native currency from `from` to `to`.
pub fn funding_request(
    from: Address,
    to: Address,
    value: U256,
    nonce: u64,
    fees: FeeParams,
    chain_id: u64,
) -> TransactionRequest {
    eip1559(fees, nonce, chain_id)
        .with_from(from)
        .with_to(to)
        .with_value(value)
}

fn eip1559(fees: FeeParams, nonce: u64, chain_id: u64) -> TransactionRequest {
    TransactionRequest::default()
        .with_nonce(nonce)
        .with_chain_id(chain_id)
        .with_gas_limit(fees.gas_limit)
        .with_max_fee_per_gas(fees.max_fee_per_gas)
        .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
}
