// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request and response types exchanged with the HTTP layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::TxStatus;

/// One delegate and the share of voting power it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DelegateAllocation {
    /// Delegate address (0x + 40 hex chars)
    pub address: String,
    /// ENS or profile name shown to the user, if resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_name: Option<String>,
    /// Share in percent, (0, 100]
    #[schema(value_type = String, example = "33.3")]
    pub percent_of_delegated: Decimal,
}

/// Request to prepare a split delegation transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSplitDelegationRequest {
    /// Chain ID
    #[serde(rename = "chainID", alias = "chainId")]
    pub chain_id: u64,
    pub delegates: Vec<DelegateAllocation>,
    /// On-chain validity deadline of the delegation
    pub expiration_date: DateTime<Utc>,
}

/// Sent by the client once the prepared transaction has been broadcast.
/// Persisting it is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDelegationRequest {
    /// Chain ID
    #[serde(rename = "chainID", alias = "chainId")]
    pub chain_id: u64,
    /// Transaction hash
    pub tx_hash: String,
    pub delegates: Vec<DelegateAllocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Unsigned transaction fields, all `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreparedSplitDelegation {
    /// Delegates contract address
    pub to: String,
    /// ABI-encoded `setDelegation` call
    pub data: String,
    /// Legacy gas price in wei
    pub gas_price: String,
    /// Max priority fee per gas in wei
    pub max_priority_fee_per_gas: String,
    /// Max fee per gas in wei
    pub max_fee_per_gas: String,
    /// Gas limit
    pub gas: String,
}

/// Transaction status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TxStatusWrapper {
    pub status: TxStatus,
}
