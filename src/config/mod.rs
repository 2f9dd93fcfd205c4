//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, or compiled-in defaults)
//!     → validation.rs (semantic checks)
//!     → SweepConfig (validated, immutable)
//!
//! SPONSOR_KEY / COMPROMISED_KEY
//!     → loader.rs (Secrets, never logged)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the sweeper runs without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_inputs, load_or_default, ConfigError, Secrets};
pub use schema::{
    AssetConfig, LogFormat, ObservabilityConfig, RelayConfig, RpcConfig, SweepConfig, SweepParams,
};
