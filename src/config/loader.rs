//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::SweepConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the sponsor account's private key.
pub const SPONSOR_KEY_ENV_VAR: &str = "SPONSOR_KEY";

/// Environment variable holding the compromised account's private key.
pub const COMPROMISED_KEY_ENV_VAR: &str = "COMPROMISED_KEY";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    MissingSecrets,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::MissingSecrets => write!(
                f,
                "Please set both {} and {} env",
                SPONSOR_KEY_ENV_VAR, COMPROMISED_KEY_ENV_VAR
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SweepConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: SweepConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the configuration file if one was given, otherwise validate the
/// compiled-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<SweepConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = SweepConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// The two signing keys the sweeper needs.
///
/// Never logged; `Debug` redacts both values.
pub struct Secrets {
    pub sponsor_key: String,
    pub compromised_key: String,
}

impl Secrets {
    /// Read both keys from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both keys through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        match (read(SPONSOR_KEY_ENV_VAR), read(COMPROMISED_KEY_ENV_VAR)) {
            (Some(sponsor_key), Some(compromised_key)) => Ok(Self {
                sponsor_key,
                compromised_key,
            }),
            _ => Err(ConfigError::MissingSecrets),
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("sponsor_key", &"<redacted>")
            .field("compromised_key", &"<redacted>")
            .finish()
    }
}

/// Read the secrets, then the configuration.
///
/// Missing keys are reported before any problem with the configuration file.
pub fn load_inputs<F>(path: Option<&Path>, lookup: F) -> Result<(Secrets, SweepConfig), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secrets = Secrets::from_lookup(lookup)?;
    let config = load_or_default(path)?;
    Ok((secrets, config))
}
