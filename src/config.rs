// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Chain descriptors are loaded once at startup from a TOML file. Every value
//! that differs between chains (RPC endpoint, delegates contract, gas limit
//! of the `setDelegation` call) lives here rather than in code.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SPLIT_DELEGATION_CONFIG` | Path to the chains TOML file | `config/chains.toml` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//!
//! ## File Layout
//!
//! ```toml
//! [gateway]
//! rpc_timeout_secs = 10
//!
//! [[chains]]
//! symbol = "ETH"
//! name = "Ethereum"
//! chain_id = 1
//! decimals = 18
//! rpc_url = "https://eth.llamarpc.com"
//! tx_scan_template = "https://etherscan.io/tx/{hash}"
//! delegates_contract = "0xDE1e8A7E184Babd9F0E3af18f40634e9Ed6F0905"
//! split_delegation_gas_limit = 250000
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde::Deserialize;

use crate::blockchain::{ChainDescriptor, ChainFamily, TX_HASH_PLACEHOLDER};

/// Environment variable name for the chains configuration file path.
pub const CONFIG_PATH_ENV: &str = "SPLIT_DELEGATION_CONFIG";

/// Config path used when `SPLIT_DELEGATION_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/chains.toml";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Per-call RPC timeout used when the file does not set one.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Largest decimals value for which `10^decimals` still fits in a `U256`.
const MAX_DECIMALS: u8 = 77;

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub gateway: GatewaySettings,
    pub chains: Vec<ChainConfig>,
}

/// Settings shared by every chain.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Default deadline for a single chain query when the caller gives none.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
        }
    }
}

impl GatewaySettings {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

/// One `[[chains]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub symbol: String,
    pub name: String,
    pub chain_id: u64,
    pub decimals: u8,
    pub rpc_url: String,
    /// Explorer link with a `{hash}` placeholder.
    pub tx_scan_template: String,
    pub delegates_contract: String,
    pub split_delegation_gas_limit: u64,
    #[serde(default = "default_true")]
    pub eip1559: bool,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default)]
    pub family: ChainFamily,
}

fn default_rpc_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_confirmations() -> u64 {
    1
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config for chain {chain}: {reason}")]
    InvalidChain { chain: String, reason: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl GatewayConfig {
    /// Load from the path in `SPLIT_DELEGATION_CONFIG`, or the default path.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            chains = config.chains.len(),
            "Loaded chain configuration"
        );
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chains.is_empty() {
            return Err(ConfigError::Invalid("at least one chain must be configured".into()));
        }
        if self.gateway.rpc_timeout_secs == 0 {
            return Err(ConfigError::Invalid("rpc_timeout_secs must be positive".into()));
        }

        let mut symbols = HashSet::new();
        let mut ids = HashSet::new();
        for chain in &self.chains {
            if !symbols.insert(chain.symbol.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate chain symbol `{}`",
                    chain.symbol
                )));
            }
            if !ids.insert(chain.chain_id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate chain id {}",
                    chain.chain_id
                )));
            }
            chain.to_descriptor()?;
        }
        Ok(())
    }

    /// Build the immutable descriptors, in file order.
    pub fn descriptors(&self) -> Result<Vec<ChainDescriptor>, ConfigError> {
        self.chains.iter().map(ChainConfig::to_descriptor).collect()
    }
}

impl ChainConfig {
    pub fn to_descriptor(&self) -> Result<ChainDescriptor, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidChain {
            chain: self.symbol.clone(),
            reason,
        };

        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol must not be empty".into()));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(invalid(format!("decimals must be at most {MAX_DECIMALS}")));
        }
        if self.split_delegation_gas_limit == 0 {
            return Err(invalid("split_delegation_gas_limit must be positive".into()));
        }
        if self.confirmations == 0 {
            return Err(invalid("confirmations must be at least 1".into()));
        }
        if !self.tx_scan_template.contains(TX_HASH_PLACEHOLDER) {
            return Err(invalid(format!(
                "tx_scan_template must contain `{TX_HASH_PLACEHOLDER}`"
            )));
        }

        let rpc_url: url::Url = self
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| invalid(format!("invalid rpc_url: {e}")))?;
        let delegates_contract = Address::from_str(&self.delegates_contract)
            .map_err(|e| invalid(format!("invalid delegates_contract: {e}")))?;

        Ok(ChainDescriptor {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            chain_id: self.chain_id,
            decimals: self.decimals,
            rpc_url,
            tx_scan_template: self.tx_scan_template.clone(),
            delegates_contract,
            split_delegation_gas_limit: U256::from(self.split_delegation_gas_limit),
            eip1559: self.eip1559,
            confirmations: self.confirmations,
            family: self.family,
        })
    }
}
