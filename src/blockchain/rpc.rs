// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability interface every chain family implements.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use super::types::{ReceiptSummary, TxLookup};

/// Node calls the gateway needs from a chain.
///
/// Implementations must be safe for concurrent use by many in-flight requests;
/// a transport that is not should pool connections internally.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Native balance of `address` at the latest block, in base units.
    async fn balance_at(&self, address: Address) -> Result<U256, ChainRpcError>;

    /// Node's suggested legacy gas price, in wei.
    async fn suggest_gas_price(&self) -> Result<u128, ChainRpcError>;

    /// Node's suggested EIP-1559 tip, in wei.
    async fn max_priority_fee(&self) -> Result<u128, ChainRpcError>;

    /// Base fee of the latest block. `None` on chains without EIP-1559.
    async fn latest_base_fee(&self) -> Result<Option<u128>, ChainRpcError>;

    async fn block_number(&self) -> Result<u64, ChainRpcError>;

    /// `None` when the node does not know the hash.
    async fn transaction_by_hash(&self, hash: TxHash) -> Result<Option<TxLookup>, ChainRpcError>;

    /// `None` while the transaction has no receipt.
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<ReceiptSummary>, ChainRpcError>;
}

/// Errors raised by a [`ChainRpc`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ChainRpcError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}
