// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Split Delegation Service
//!
//! Entry point for the HTTP layer. Input reaching this service has already
//! been validated upstream; the service turns it into an unsigned
//! transaction, reports transaction status, and summarises chain state.
//!
//! ## Prepare Flow
//!
//! 1. Resolve the chain (unknown chain fails before anything else)
//! 2. Percents → minimal ratios
//! 3. Ratios → `setDelegation` calldata (malformed input fails here, offline)
//! 4. Fee quote from the chain; any fee failure aborts the whole prepare

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;

use super::contract::encode_set_delegation;
use super::ratio::allocate_ratios;
use crate::blockchain::{CallContext, ChainRegistry, ChainsInfo, GasEstimator, StatusTracker};
use crate::error::GatewayError;
use crate::models::{
    PrepareSplitDelegationRequest, PreparedSplitDelegation, SuccessDelegationRequest,
    TxStatusWrapper,
};

#[derive(Clone)]
pub struct SplitDelegationService {
    registry: Arc<ChainRegistry>,
    gas: GasEstimator,
    status: StatusTracker,
}

impl SplitDelegationService {
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self {
            gas: GasEstimator::new(registry.clone()),
            status: StatusTracker::new(registry.clone()),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ChainRegistry> {
        &self.registry
    }

    /// Build the unsigned `setDelegation` transaction for `dao`.
    pub async fn prepare(
        &self,
        ctx: &CallContext,
        dao: &str,
        request: &PrepareSplitDelegationRequest,
    ) -> Result<PreparedSplitDelegation, GatewayError> {
        let descriptor = self.registry.descriptor(request.chain_id)?;

        let ratios = allocate_ratios(
            request
                .delegates
                .iter()
                .map(|d| (d.address.as_str(), d.percent_of_delegated)),
        )?;
        let data = encode_set_delegation(dao, &ratios, request.expiration_date.timestamp())?;

        let fees = self.gas.estimate(ctx, request.chain_id).await?;

        tracing::info!(
            chain_id = request.chain_id,
            dao,
            delegates = ratios.len(),
            gas = %fees.gas_limit,
            "Prepared split delegation"
        );

        Ok(PreparedSplitDelegation {
            to: descriptor.delegates_contract.to_string(),
            data,
            gas_price: fees.gas_price_hex(),
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas_hex(),
            max_fee_per_gas: fees.max_fee_per_gas_hex(),
            gas: fees.gas_limit_hex(),
        })
    }

    pub async fn transaction_status(
        &self,
        ctx: &CallContext,
        chain_id: u64,
        tx_hash: &str,
    ) -> Result<TxStatusWrapper, GatewayError> {
        let status = self.status.status(ctx, chain_id, tx_hash).await?;
        Ok(TxStatusWrapper { status })
    }

    /// Balance and fee approximation on every chain; fails as a whole.
    pub async fn chains_info(
        &self,
        ctx: &CallContext,
        address: &str,
    ) -> Result<ChainsInfo, GatewayError> {
        let address = Address::from_str(address.trim())
            .map_err(|e| GatewayError::InvalidAddress(format!("{address}: {e}")))?;
        self.registry.chains_info(ctx, address).await
    }

    /// Explorer link for a broadcast delegation.
    pub fn explorer_link(
        &self,
        request: &SuccessDelegationRequest,
    ) -> Result<String, GatewayError> {
        let descriptor = self.registry.descriptor(request.chain_id)?;
        Ok(descriptor.explorer_link(&request.tx_hash))
    }
}
