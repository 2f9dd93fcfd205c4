//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that addresses, URLs, amounts and token ids parse
//! - Validate value ranges (timeouts > 0, gas limits > 0, fee ordering)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SweepConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::config::schema::SweepConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: invalid address '{value}'")]
    InvalidAddress { field: String, value: String },

    #[error("{field}: invalid token id '{value}'")]
    InvalidTokenId { field: String, value: String },

    #[error("sweep.funding_eth: invalid ether amount '{0}'")]
    InvalidAmount(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("no assets configured")]
    NoAssets,

    #[error("assets[{0}] has no token ids")]
    EmptyAsset(usize),

    #[error("max priority fee ({priority} gwei) exceeds max fee ({max} gwei)")]
    PriorityFeeAboveMax { priority: u64, max: u64 },

    #[error("observability.metrics_address: invalid socket address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &SweepConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "rpc.url", &config.rpc.url);
    for url in &config.rpc.failover_urls {
        check_url(&mut errors, "rpc.failover_urls", url);
    }
    check_url(&mut errors, "relay.url", &config.relay.url);

    if config.rpc.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero("rpc.rpc_timeout_secs"));
    }
    if config.rpc.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero("rpc.poll_interval_ms"));
    }
    if config.relay.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("relay.request_timeout_secs"));
    }
    if config.relay.resolution_timeout_secs == 0 {
        errors.push(ValidationError::Zero("relay.resolution_timeout_secs"));
    }

    let sweep = &config.sweep;
    if Address::from_str(&sweep.receiver).is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "sweep.receiver".to_string(),
            value: sweep.receiver.clone(),
        });
    }
    if parse_ether(&sweep.funding_eth).is_err() {
        errors.push(ValidationError::InvalidAmount(sweep.funding_eth.clone()));
    }
    if sweep.transfer_gas_limit == 0 {
        errors.push(ValidationError::Zero("sweep.transfer_gas_limit"));
    }
    if sweep.funding_gas_limit == 0 {
        errors.push(ValidationError::Zero("sweep.funding_gas_limit"));
    }
    if sweep.max_fee_per_gas_gwei == 0 {
        errors.push(ValidationError::Zero("sweep.max_fee_per_gas_gwei"));
    }
    if sweep.max_priority_fee_per_gas_gwei > sweep.max_fee_per_gas_gwei {
        errors.push(ValidationError::PriorityFeeAboveMax {
            priority: sweep.max_priority_fee_per_gas_gwei,
            max: sweep.max_fee_per_gas_gwei,
        });
    }

    if config.assets.is_empty() {
        errors.push(ValidationError::NoAssets);
    }
    for (i, asset) in config.assets.iter().enumerate() {
        if Address::from_str(&asset.contract).is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: format!("assets[{}].contract", i),
                value: asset.contract.clone(),
            });
        }
        if asset.token_ids.is_empty() {
            errors.push(ValidationError::EmptyAsset(i));
        }
        for id in &asset.token_ids {
            if U256::from_str(id).is_err() {
                errors.push(ValidationError::InvalidTokenId {
                    field: format!("assets[{}].token_ids", i),
                    value: id.clone(),
                });
            }
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if url::Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
