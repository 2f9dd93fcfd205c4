//! Typed asset descriptors.

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::config::AssetConfig;
use crate::sweep::error::{SweepError, SweepResult};

/// A collection contract and the token ids to recover from it, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetDescriptor {
    pub collection: Address,
    pub token_ids: Vec<U256>,
}

impl AssetDescriptor {
    /// Parse one configured collection.
    pub fn from_config(config: &AssetConfig) -> SweepResult<Self> {
        let collection = Address::from_str(&config.contract).map_err(|e| {
            SweepError::InvalidParameter(format!("asset contract '{}': {}", config.contract, e))
        })?;
        let token_ids = config
            .token_ids
            .iter()
            .map(|id| {
                U256::from_str(id).map_err(|e| {
                    SweepError::InvalidParameter(format!("token id '{}': {}", id, e))
                })
            })
            .collect::<SweepResult<Vec<_>>>()?;
        Ok(Self {
            collection,
            token_ids,
        })
    }

    /// Parse every configured collection, preserving declaration order.
    pub fn from_configs(configs: &[AssetConfig]) -> SweepResult<Vec<Self>> {
        configs.iter().map(Self::from_config).collect()
    }
}

/// Every `(collection, token id)` pair in declaration order.
pub fn flatten(assets: &[AssetDescriptor]) -> impl Iterator<Item = (Address, U256)> + '_ {
    assets
        .iter()
        .flat_map(|asset| asset.token_ids.iter().map(move |id| (asset.collection, *id)))
}
