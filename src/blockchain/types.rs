// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types shared by the registry, estimator and tracker.

use std::collections::BTreeMap;
use std::fmt::LowerHex;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Placeholder replaced by the transaction hash in explorer templates.
pub const TX_HASH_PLACEHOLDER: &str = "{hash}";

/// RPC dialect a chain speaks. Each family has one [`ChainRpc`](super::ChainRpc)
/// implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    #[default]
    Evm,
}

/// Immutable description of a supported chain.
#[derive(Debug, Clone)]
pub struct ChainDescriptor {
    /// Ticker of the native token, also the key in [`ChainsInfo`]
    pub symbol: String,
    /// Network name for display
    pub name: String,
    /// EIP-155 chain ID
    pub chain_id: u64,
    /// Native token decimals
    pub decimals: u8,
    /// RPC endpoint URL
    pub rpc_url: url::Url,
    /// Explorer transaction link containing `{hash}`
    pub tx_scan_template: String,
    /// Split delegation contract deployed on this chain
    pub delegates_contract: Address,
    /// Fixed gas limit for `setDelegation`
    pub split_delegation_gas_limit: U256,
    /// Whether the chain prices gas with base fee + priority fee
    pub eip1559: bool,
    /// Receipt depth required before a status is reported as final
    pub confirmations: u64,
    pub family: ChainFamily,
}

impl ChainDescriptor {
    /// Explorer link for a transaction hash.
    pub fn explorer_link(&self, tx_hash: &str) -> String {
        self.tx_scan_template.replace(TX_HASH_PLACEHOLDER, tx_hash)
    }
}

/// Snapshot of one chain for the user's address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    /// Chain ID
    pub id: u64,
    /// Network name
    pub name: String,
    /// Native balance in human units
    pub balance: String,
    /// Native token symbol
    pub symbol: String,
    /// `gasPrice * gasLimit` of a split delegation, in human units
    pub fee_approximation: String,
    /// Explorer link template containing `{hash}`
    pub tx_scan_template: String,
}

/// Per-chain snapshots keyed by chain symbol.
pub type ChainsInfo = BTreeMap<String, ChainInfo>;

/// Result of a transaction lookup by hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxLookup {
    /// Block the transaction was mined in, if any
    pub block_number: Option<u64>,
}

impl TxLookup {
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

/// The part of a transaction receipt the status tracker needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Whether the transaction was successful
    pub success: bool,
}

/// Confirmation state of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl TxStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

/// Render an integer as an Ethereum JSON-RPC quantity (`0x`-prefixed, no
/// leading zeros).
pub fn to_hex_quantity<T: LowerHex>(value: T) -> String {
    format!("0x{value:x}")
}

/// Format wei (or token units) to a human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        let one_eth = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_amount(one_eth, 18), "1");

        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_amount(one_and_half, 18), "1.5");

        let dust = U256::from(1u64);
        assert_eq!(format_amount(dust, 18), "0.000000000000000001");

        assert_eq!(format_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_format_amount_six_decimals() {
        let one_usdc = U256::from(1_000_000u64);
        assert_eq!(format_amount(one_usdc, 6), "1");

        let one_and_half = U256::from(1_500_000u64);
        assert_eq!(format_amount(one_and_half, 6), "1.5");
    }

    #[test]
    fn test_hex_quantity() {
        assert_eq!(to_hex_quantity(0u64), "0x0");
        assert_eq!(to_hex_quantity(250_000u64), "0x3d090");
        assert_eq!(to_hex_quantity(U256::from(30_000_000_000u64)), "0x6fc23ac00");
        assert_eq!(to_hex_quantity(1_500_000_000u128), "0x59682f00");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&TxStatus::Pending).unwrap(), r#""pending""#);
        assert_eq!(serde_json::to_string(&TxStatus::Success).unwrap(), r#""success""#);
        assert!(TxStatus::Failed.is_terminal());
        assert!(!TxStatus::Pending.is_terminal());
    }

    #[test]
    fn test_chain_info_uses_camel_case() {
        let info = ChainInfo {
            id: 1,
            name: "Ethereum".into(),
            balance: "1.5".into(),
            symbol: "ETH".into(),
            fee_approximation: "0.0075".into(),
            tx_scan_template: "https://etherscan.io/tx/{hash}".into(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["feeApproximation"], "0.0075");
        assert_eq!(json["txScanTemplate"], "https://etherscan.io/tx/{hash}");
    }
}
