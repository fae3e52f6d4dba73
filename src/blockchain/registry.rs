// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Chain Registry
//!
//! One immutable [`ChainDescriptor`] and one live [`ChainRpc`] connection per
//! supported chain. The registry is built once at startup and shared through
//! an `Arc`; nothing mutates it afterwards.
//!
//! Every async operation takes a [`CallContext`]. Cancelling its token or
//! reaching its deadline drops the in-flight node calls instead of leaking
//! them.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use futures::future::try_join_all;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::client::EvmClient;
use super::rpc::{ChainRpc, ChainRpcError};
use super::types::{
    format_amount, to_hex_quantity, ChainDescriptor, ChainFamily, ChainInfo, ChainsInfo,
    ReceiptSummary, TxLookup,
};
use crate::config::{ConfigError, GatewayConfig};
use crate::error::GatewayError;

/// Cancellation and deadline for one caller request.
#[derive(Debug, Clone)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::new(CancellationToken::new())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drive `fut` until it completes, the token fires, or the deadline passes.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        match self.deadline {
            Some(deadline) => {
                let budget = deadline.saturating_duration_since(Instant::now());
                tokio::select! {
                    _ = self.cancel.cancelled() => Err(GatewayError::Cancelled),
                    outcome = tokio::time::timeout_at(deadline, fut) => {
                        outcome.unwrap_or_else(|_| Err(GatewayError::Timeout(budget)))
                    }
                }
            }
            None => {
                tokio::select! {
                    _ = self.cancel.cancelled() => Err(GatewayError::Cancelled),
                    outcome = fut => outcome,
                }
            }
        }
    }
}

struct ChainEntry {
    descriptor: ChainDescriptor,
    rpc: Arc<dyn ChainRpc>,
}

/// Registered chains keyed by chain ID.
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainEntry>,
    rpc_timeout: Duration,
}

impl ChainRegistry {
    /// Build descriptors from configuration and open one connection per chain.
    pub fn connect(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(config.chains.len());
        for descriptor in config.descriptors()? {
            let rpc: Arc<dyn ChainRpc> = match descriptor.family {
                ChainFamily::Evm => {
                    let client = EvmClient::new(descriptor.chain_id, descriptor.rpc_url.as_str())
                        .map_err(|e| ConfigError::InvalidChain {
                            chain: descriptor.symbol.clone(),
                            reason: e.to_string(),
                        })?;
                    Arc::new(client)
                }
            };
            tracing::info!(
                chain_id = descriptor.chain_id,
                symbol = %descriptor.symbol,
                contract = %descriptor.delegates_contract,
                "Registered chain"
            );
            entries.push((descriptor, rpc));
        }
        Ok(Self::from_parts(entries, config.gateway.rpc_timeout()))
    }

    /// Build from already-constructed connections.
    pub fn from_parts(
        entries: Vec<(ChainDescriptor, Arc<dyn ChainRpc>)>,
        rpc_timeout: Duration,
    ) -> Self {
        let chains = entries
            .into_iter()
            .map(|(descriptor, rpc)| (descriptor.chain_id, ChainEntry { descriptor, rpc }))
            .collect();
        Self {
            chains,
            rpc_timeout,
        }
    }

    /// Default deadline for callers that do not bring their own.
    pub fn rpc_timeout(&self) -> Duration {
        self.rpc_timeout
    }

    /// A context bounded by the configured RPC timeout.
    pub fn default_context(&self, cancel: CancellationToken) -> CallContext {
        CallContext::new(cancel).with_timeout(self.rpc_timeout)
    }

    pub fn descriptor(&self, chain_id: u64) -> Result<&ChainDescriptor, GatewayError> {
        self.entry(chain_id).map(|entry| &entry.descriptor)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.values().map(|entry| &entry.descriptor)
    }

    fn entry(&self, chain_id: u64) -> Result<&ChainEntry, GatewayError> {
        self.chains
            .get(&chain_id)
            .ok_or(GatewayError::UnknownChain(chain_id))
    }

    async fn call<T, F, Fut>(
        &self,
        ctx: &CallContext,
        chain_id: u64,
        operation: &'static str,
        f: F,
    ) -> Result<T, GatewayError>
    where
        F: FnOnce(Arc<dyn ChainRpc>) -> Fut,
        Fut: Future<Output = Result<T, ChainRpcError>>,
    {
        let rpc = self.entry(chain_id)?.rpc.clone();
        let result = ctx
            .run(async move {
                f(rpc).await.map_err(|e| GatewayError::ChainUnreachable {
                    chain_id,
                    operation,
                    reason: e.to_string(),
                })
            })
            .await;

        if let Err(e) = &result {
            tracing::warn!(chain_id, operation, error = %e, "Chain call failed");
        }
        result
    }

    pub async fn balance_at(
        &self,
        ctx: &CallContext,
        chain_id: u64,
        address: Address,
    ) -> Result<U256, GatewayError> {
        self.call(ctx, chain_id, "balance_at", |rpc| async move {
            rpc.balance_at(address).await
        })
        .await
    }

    pub async fn suggest_gas_price(
        &self,
        ctx: &CallContext,
        chain_id: u64,
    ) -> Result<u128, GatewayError> {
        self.call(ctx, chain_id, "suggest_gas_price", |rpc| async move {
            rpc.suggest_gas_price().await
        })
        .await
    }

    pub async fn max_priority_fee(
        &self,
        ctx: &CallContext,
        chain_id: u64,
    ) -> Result<u128, GatewayError> {
        self.call(ctx, chain_id, "max_priority_fee", |rpc| async move {
            rpc.max_priority_fee().await
        })
        .await
    }

    pub async fn latest_base_fee(
        &self,
        ctx: &CallContext,
        chain_id: u64,
    ) -> Result<Option<u128>, GatewayError> {
        self.call(ctx, chain_id, "latest_base_fee", |rpc| async move {
            rpc.latest_base_fee().await
        })
        .await
    }

    pub async fn block_number(
        &self,
        ctx: &CallContext,
        chain_id: u64,
    ) -> Result<u64, GatewayError> {
        self.call(ctx, chain_id, "block_number", |rpc| async move {
            rpc.block_number().await
        })
        .await
    }

    pub async fn transaction_by_hash(
        &self,
        ctx: &CallContext,
        chain_id: u64,
        hash: TxHash,
    ) -> Result<Option<TxLookup>, GatewayError> {
        self.call(ctx, chain_id, "transaction_by_hash", |rpc| async move {
            rpc.transaction_by_hash(hash).await
        })
        .await
    }

    pub async fn transaction_receipt(
        &self,
        ctx: &CallContext,
        chain_id: u64,
        hash: TxHash,
    ) -> Result<Option<ReceiptSummary>, GatewayError> {
        self.call(ctx, chain_id, "transaction_receipt", |rpc| async move {
            rpc.transaction_receipt(hash).await
        })
        .await
    }

    /// Live suggested gas price as a `0x` quantity.
    pub async fn gas_price_hex(
        &self,
        ctx: &CallContext,
        chain_id: u64,
    ) -> Result<String, GatewayError> {
        let price = self.suggest_gas_price(ctx, chain_id).await?;
        Ok(to_hex_quantity(price))
    }

    /// Configured `setDelegation` gas limit as a `0x` quantity.
    pub fn gas_limit_hex(&self, chain_id: u64) -> Result<String, GatewayError> {
        let descriptor = self.descriptor(chain_id)?;
        Ok(to_hex_quantity(descriptor.split_delegation_gas_limit))
    }

    /// Balance and fee approximation for `address` on every registered chain.
    ///
    /// Chains are queried concurrently. The result is all-or-nothing: if any
    /// chain fails, the whole call fails and no partial map is returned.
    pub async fn chains_info(
        &self,
        ctx: &CallContext,
        address: Address,
    ) -> Result<ChainsInfo, GatewayError> {
        let queries = self.chains.values().map(|entry| async move {
            let descriptor = &entry.descriptor;
            let chain_id = descriptor.chain_id;
            let (balance, gas_price) = futures::try_join!(
                self.balance_at(ctx, chain_id, address),
                self.suggest_gas_price(ctx, chain_id),
            )?;

            let fee = U256::from(gas_price)
                .checked_mul(descriptor.split_delegation_gas_limit)
                .ok_or_else(|| GatewayError::ChainUnreachable {
                    chain_id,
                    operation: "suggest_gas_price",
                    reason: format!("gas price {gas_price} overflows fee approximation"),
                })?;

            Ok::<_, GatewayError>((
                descriptor.symbol.clone(),
                ChainInfo {
                    id: chain_id,
                    name: descriptor.name.clone(),
                    balance: format_amount(balance, descriptor.decimals),
                    symbol: descriptor.symbol.clone(),
                    fee_approximation: format_amount(fee, descriptor.decimals),
                    tx_scan_template: descriptor.tx_scan_template.clone(),
                },
            ))
        });

        let infos = ctx.run(try_join_all(queries)).await?;

        tracing::debug!(%address, chains = infos.len(), "Collected chains info");
        Ok(infos.into_iter().collect())
    }
}
