// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain client for blockchain interactions.

use alloy::{
    eips::BlockNumberOrTag,
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use async_trait::async_trait;

use super::rpc::{ChainRpc, ChainRpcError};
use super::types::{ReceiptSummary, TxLookup};

/// Read-only client for one EVM chain.
///
/// The underlying alloy HTTP transport wraps a pooled `reqwest` client, so a
/// single instance is shared by every concurrent request for its chain.
#[derive(Clone)]
pub struct EvmClient {
    /// Chain ID, kept for log context
    chain_id: u64,
    /// Alloy HTTP provider
    provider: DynProvider<Ethereum>,
}

impl EvmClient {
    /// Create a new client for the given RPC endpoint.
    pub fn new(chain_id: u64, rpc_url: &str) -> Result<Self, ChainRpcError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainRpcError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        tracing::debug!(chain_id, "EVM client created");

        Ok(Self { chain_id, provider })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

fn rpc_error(e: impl std::fmt::Display) -> ChainRpcError {
    ChainRpcError::Rpc(e.to_string())
}

#[async_trait]
impl ChainRpc for EvmClient {
    async fn balance_at(&self, address: Address) -> Result<U256, ChainRpcError> {
        self.provider.get_balance(address).await.map_err(rpc_error)
    }

    async fn suggest_gas_price(&self) -> Result<u128, ChainRpcError> {
        self.provider.get_gas_price().await.map_err(rpc_error)
    }

    async fn max_priority_fee(&self) -> Result<u128, ChainRpcError> {
        self.provider
            .get_max_priority_fee_per_gas()
            .await
            .map_err(rpc_error)
    }

    async fn latest_base_fee(&self) -> Result<Option<u128>, ChainRpcError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(rpc_error)?
            .ok_or_else(|| ChainRpcError::UnexpectedResponse("No latest block".to_string()))?;

        Ok(block.header.base_fee_per_gas.map(u128::from))
    }

    async fn block_number(&self) -> Result<u64, ChainRpcError> {
        self.provider.get_block_number().await.map_err(rpc_error)
    }

    async fn transaction_by_hash(&self, hash: TxHash) -> Result<Option<TxLookup>, ChainRpcError> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(rpc_error)?;

        Ok(tx.map(|tx| TxLookup {
            block_number: tx.block_number,
        }))
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<ReceiptSummary>, ChainRpcError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(rpc_error)?;

        Ok(receipt.map(|r| ReceiptSummary {
            block_number: r.block_number(),
            success: r.status(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_rpc_url() {
        let err = EvmClient::new(1, "not a url").err().unwrap();
        assert!(matches!(err, ChainRpcError::InvalidRpcUrl(_)));
    }

    #[tokio::test]
    async fn builds_client_without_network_access() {
        let client = EvmClient::new(43113, "http://127.0.0.1:9650/ext/bc/C/rpc").unwrap();
        assert_eq!(client.chain_id(), 43113);
    }
}
