//! Bundle planning and signing.
//!
//! A bundle is always `[funding, transfer_0, .., transfer_n]`: the sponsor
//! pays for gas first, then every token leaves the compromised account with
//! consecutive nonces in declaration order.

use std::str::FromStr;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use futures_util::future::try_join_all;
use serde::Serialize;

use crate::blockchain::transaction::{funding_request, transfer_request};
use crate::blockchain::{BlockchainError, BlockchainResult, FeeParams, Wallet};
use crate::config::SweepConfig;
use crate::relay::{SignedBundle, SignedTransaction};
use crate::sweep::assets::{flatten, AssetDescriptor};
use crate::sweep::error::{SweepError, SweepResult};

/// Which account originates a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Sponsor,
    Compromised,
}

/// Static parameters of every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    pub receiver: Address,
    pub funding_value: U256,
    pub transfer_fees: FeeParams,
    pub funding_fees: FeeParams,
    pub chain_id: u64,
    pub assets: Vec<AssetDescriptor>,
}

/// One unsigned bundle entry.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedTransaction {
    pub origin: Origin,
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip)]
    pub request: TransactionRequest,
}

/// An unsigned bundle for one target block.
#[derive(Debug, Clone, Serialize)]
pub struct BundlePlan {
    pub target_block: u64,
    pub transactions: Vec<PlannedTransaction>,
}

impl SweepPlan {
    /// Build the plan from a validated configuration.
    pub fn from_config(config: &SweepConfig) -> SweepResult<Self> {
        let sweep = &config.sweep;
        let receiver = Address::from_str(&sweep.receiver).map_err(|e| {
            SweepError::InvalidParameter(format!("receiver '{}': {}", sweep.receiver, e))
        })?;
        let funding_value = parse_ether(&sweep.funding_eth).map_err(|e| {
            SweepError::InvalidParameter(format!("funding amount '{}': {}", sweep.funding_eth, e))
        })?;
        let transfer_fees = FeeParams::from_gwei(
            sweep.max_fee_per_gas_gwei,
            sweep.max_priority_fee_per_gas_gwei,
            sweep.transfer_gas_limit,
        );

        Ok(Self {
            receiver,
            funding_value,
            transfer_fees,
            funding_fees: transfer_fees.with_gas_limit(sweep.funding_gas_limit),
            chain_id: config.rpc.chain_id,
            assets: AssetDescriptor::from_configs(&config.assets)?,
        })
    }

    /// Number of asset transfers per bundle.
    pub fn transfer_count(&self) -> usize {
        self.assets.iter().map(|asset| asset.token_ids.len()).sum()
    }

    /// Worst-case gas the compromised account spends on transfers.
    pub fn max_transfer_cost(&self) -> U256 {
        self.transfer_fees.max_cost() * U256::from(self.transfer_count())
    }

    /// Lay out the bundle for `target_block` from freshly read nonces.
    pub fn plan(
        &self,
        sponsor: Address,
        compromised: Address,
        sponsor_nonce: u64,
        compromised_nonce: u64,
        target_block: u64,
    ) -> BundlePlan {
        let mut transactions = Vec::with_capacity(self.transfer_count() + 1);

        transactions.push(PlannedTransaction {
            origin: Origin::Sponsor,
            from: sponsor,
            to: compromised,
            nonce: sponsor_nonce,
            token_id: None,
            value: Some(self.funding_value),
            request: funding_request(
                sponsor,
                compromised,
                self.funding_value,
                sponsor_nonce,
                self.funding_fees,
                self.chain_id,
            ),
        });

        let mut nonce = compromised_nonce;
        for (collection, token_id) in flatten(&self.assets) {
            transactions.push(PlannedTransaction {
                origin: Origin::Compromised,
                from: compromised,
                to: collection,
                nonce,
                token_id: Some(token_id),
                value: None,
                request: transfer_request(
                    collection,
                    compromised,
                    self.receiver,
                    token_id,
                    nonce,
                    self.transfer_fees,
                    self.chain_id,
                ),
            });
            nonce += 1;
        }

        BundlePlan {
            target_block,
            transactions,
        }
    }
}

/// Sign every planned transaction with its origin account, keeping order.
pub async fn sign_bundle(
    plan: &BundlePlan,
    sponsor: &Wallet,
    compromised: &Wallet,
) -> BlockchainResult<SignedBundle> {
    let transactions = try_join_all(plan.transactions.iter().map(|planned| async move {
        let wallet = match planned.origin {
            Origin::Sponsor => sponsor,
            Origin::Compromised => compromised,
        };
        let envelope = wallet.sign_request(planned.request.clone()).await?;
        Ok::<_, BlockchainError>(SignedTransaction::from_envelope(
            &envelope,
            wallet.address(),
            planned.nonce,
        ))
    }))
    .await?;

    Ok(SignedBundle {
        target_block: plan.target_block,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const SPONSOR_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const COMPROMISED_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const SPONSOR: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const COMPROMISED: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn plan() -> SweepPlan {
        SweepPlan::from_config(&SweepConfig::default()).unwrap()
    }

    #[test]
    fn test_plan_from_default_config() {
        let plan = plan();
        assert_eq!(plan.transfer_count(), 10);
        assert_eq!(plan.funding_value, U256::from(40_000_000_000_000_000u128));
        assert_eq!(plan.funding_fees.gas_limit, 21_000);
        assert_eq!(plan.transfer_fees.gas_limit, 50_000);
        assert_eq!(plan.max_transfer_cost(), U256::from(50_000_000_000_000_000u128));
    }

    #[test]
    fn test_funding_first_then_consecutive_transfers() {
        let bundle = plan().plan(SPONSOR, COMPROMISED, 12, 40, 101);

        assert_eq!(bundle.target_block, 101);
        assert_eq!(bundle.transactions.len(), 11);

        let funding = &bundle.transactions[0];
        assert_eq!(funding.origin, Origin::Sponsor);
        assert_eq!(funding.to, COMPROMISED);
        assert_eq!(funding.nonce, 12);

        let nonces: Vec<u64> = bundle.transactions[1..].iter().map(|tx| tx.nonce).collect();
        assert_eq!(nonces, (40..50).collect::<Vec<_>>());
        assert!(bundle.transactions[1..]
            .iter()
            .all(|tx| tx.origin == Origin::Compromised && tx.from == COMPROMISED));

        let first_ids: Vec<u64> = bundle.transactions[1..4]
            .iter()
            .map(|tx| tx.token_id.unwrap().to::<u64>())
            .collect();
        assert_eq!(first_ids, vec![9693, 9661, 9445]);
    }

    #[tokio::test]
    async fn test_sign_bundle_keeps_order_and_signers() {
        let sponsor = Wallet::from_private_key(SPONSOR_KEY, 1).unwrap();
        let compromised = Wallet::from_private_key(COMPROMISED_KEY, 1).unwrap();
        let planned = plan().plan(sponsor.address(), compromised.address(), 0, 5, 7);

        let signed = sign_bundle(&planned, &sponsor, &compromised).await.unwrap();
        assert_eq!(signed.target_block, 7);
        assert_eq!(signed.transactions.len(), 11);
        assert_eq!(signed.transactions[0].from, sponsor.address());
        assert_eq!(signed.transactions[1].from, compromised.address());
        assert_eq!(signed.transactions[1].nonce, 5);
        assert_eq!(signed.transactions[10].nonce, 14);
        assert_eq!(
            signed.account_nonces(),
            vec![(sponsor.address(), 0), (compromised.address(), 5)]
        );
    }

    #[test]
    fn test_plan_serializes_without_requests() {
        let bundle = plan().plan(SPONSOR, COMPROMISED, 0, 0, 1);
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["transactions"][0]["origin"], "sponsor");
        assert!(json["transactions"][0].get("request").is_none());
        assert!(json["transactions"][1].get("value").is_none());
    }
}
