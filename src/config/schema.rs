//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sweeper.
//! All types derive Serde traits for deserialization from config files, and
//! every default reproduces the compiled-in recovery target.

use serde::{Deserialize, Serialize};

/// Root configuration for the sweeper.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Node RPC settings.
    pub rpc: RpcConfig,

    /// Bundle relay settings.
    pub relay: RelayConfig,

    /// Receiver, funding and fee parameters.
    pub sweep: SweepParams,

    /// Asset collections to recover, in transfer order.
    pub assets: Vec<AssetConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            relay: RelayConfig::default(),
            sweep: SweepParams::default(),
            assets: default_assets(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Node RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// How often the block watcher and resolution wait poll the node.
    pub poll_interval_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            poll_interval_ms: 1000,
        }
    }
}

/// Bundle relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay JSON-RPC endpoint.
    pub url: String,

    /// Timeout for a single relay request in seconds.
    pub request_timeout_secs: u64,

    /// Upper bound on waiting for a bundle resolution in seconds.
    pub resolution_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: "https://relay.flashbots.net".to_string(),
            request_timeout_secs: 10,
            resolution_timeout_secs: 300,
        }
    }
}

/// Receiver, funding amount and fee parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepParams {
    /// Address that receives every recovered asset.
    pub receiver: String,

    /// Native currency the sponsor sends to the compromised account, in ether.
    pub funding_eth: String,

    /// EIP-1559 max fee per gas, in gwei.
    pub max_fee_per_gas_gwei: u64,

    /// EIP-1559 max priority fee per gas, in gwei.
    pub max_priority_fee_per_gas_gwei: u64,

    /// Gas limit of every asset transfer.
    pub transfer_gas_limit: u64,

    /// Gas limit of the funding transfer.
    pub funding_gas_limit: u64,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            receiver: "0x62f4F40043D67a12febe79E3868237FE11b87251".to_string(),
            funding_eth: "0.04".to_string(),
            max_fee_per_gas_gwei: 100,
            max_priority_fee_per_gas_gwei: 50,
            transfer_gas_limit: 50_000,
            funding_gas_limit: 21_000,
        }
    }
}

/// One asset collection and the token ids to pull out of it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AssetConfig {
    /// Collection contract address.
    pub contract: String,

    /// Token ids as decimal or `0x`-prefixed hex strings.
    ///
    /// Kept as strings because TOML integers cannot hold 256-bit ids.
    pub token_ids: Vec<String>,
}

impl AssetConfig {
    fn new(contract: &str, token_ids: &[&str]) -> Self {
        Self {
            contract: contract.to_string(),
            token_ids: token_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// The compiled-in recovery target.
pub fn default_assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig::new(
            "0x8d0802559775C70fb505f22988a4FD4A4f6D3B62",
            &["9693", "9661", "9445"],
        ),
        AssetConfig::new("0xC3A314dBcE1A2D86Fd974238529e4D2784De11b5", &["18"]),
        AssetConfig::new(
            "0x57f1887a8BF19b14fC0dF6Fd9B2acc9Af147eA85",
            &["44345741729242902331877186582625108662744868218298972493141527835479300933818"],
        ),
        AssetConfig::new("0x9D90669665607F08005CAe4A7098143f554c59EF", &["160516"]),
        AssetConfig::new("0x25ed58c027921E14D86380eA2646E3a1B5C55A8b", &["2720"]),
        AssetConfig::new(
            "0x495f947276749Ce646f68AC8c248420045cb7b5e",
            &["79063567087551997350998521341699779892441081020608625409344522844864463765505"],
        ),
        AssetConfig::new("0x6aC459c3C83947ef94b6af1123a8162FE480D419", &["2656"]),
        AssetConfig::new("0x0000000000664ceffed39244a8312bD895470803", &["282943"]),
    ]
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output for terminals.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Default log level, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Enable the Prometheus metrics listener.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}
