// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fee market queries for the split delegation transaction.

use std::sync::Arc;

use alloy::primitives::U256;

use super::registry::{CallContext, ChainRegistry};
use super::types::to_hex_quantity;
use crate::error::GatewayError;

/// Fee parameters for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeQuote {
    /// Suggested legacy gas price
    pub gas_price: u128,
    /// Max priority fee per gas (tip)
    pub max_priority_fee_per_gas: u128,
    /// Max fee per gas (base fee headroom + tip)
    pub max_fee_per_gas: u128,
    /// Gas limit configured for the call
    pub gas_limit: U256,
}

impl FeeQuote {
    pub fn gas_price_hex(&self) -> String {
        to_hex_quantity(self.gas_price)
    }

    pub fn max_priority_fee_per_gas_hex(&self) -> String {
        to_hex_quantity(self.max_priority_fee_per_gas)
    }

    pub fn max_fee_per_gas_hex(&self) -> String {
        to_hex_quantity(self.max_fee_per_gas)
    }

    pub fn gas_limit_hex(&self) -> String {
        to_hex_quantity(self.gas_limit)
    }

    /// Worst-case cost of the transaction in wei.
    pub fn max_cost(&self) -> U256 {
        self.gas_limit.saturating_mul(U256::from(self.max_fee_per_gas))
    }
}

/// Reads a chain's current fee market through the registry.
#[derive(Clone)]
pub struct GasEstimator {
    registry: Arc<ChainRegistry>,
}

impl GasEstimator {
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self { registry }
    }

    /// Quote fees for a `setDelegation` call on `chain_id`.
    ///
    /// Any failed fee query fails the whole quote; a stale or partial fee set
    /// risks a transaction that never gets included.
    pub async fn estimate(
        &self,
        ctx: &CallContext,
        chain_id: u64,
    ) -> Result<FeeQuote, GatewayError> {
        let descriptor = self.registry.descriptor(chain_id)?;
        let gas_limit = descriptor.split_delegation_gas_limit;

        let gas_price = self
            .registry
            .suggest_gas_price(ctx, chain_id)
            .await
            .map_err(|e| fee_failure(chain_id, e))?;

        if !descriptor.eip1559 {
            return Ok(FeeQuote {
                gas_price,
                max_priority_fee_per_gas: gas_price,
                max_fee_per_gas: gas_price,
                gas_limit,
            });
        }

        let (priority_fee, base_fee) = futures::try_join!(
            self.registry.max_priority_fee(ctx, chain_id),
            self.registry.latest_base_fee(ctx, chain_id),
        )
        .map_err(|e| fee_failure(chain_id, e))?;

        // Max fee = 2 * base_fee + priority_fee (allows for base fee increase)
        let max_fee = match base_fee {
            Some(base_fee) => base_fee.saturating_mul(2).saturating_add(priority_fee),
            None => gas_price.max(priority_fee),
        };

        let quote = FeeQuote {
            gas_price,
            max_priority_fee_per_gas: priority_fee,
            max_fee_per_gas: max_fee,
            gas_limit,
        };

        tracing::debug!(
            chain_id,
            gas_price,
            max_priority_fee_per_gas = quote.max_priority_fee_per_gas,
            max_fee_per_gas = quote.max_fee_per_gas,
            "Fee quote"
        );

        Ok(quote)
    }
}

/// Chain failures become `EstimateFeeFailed`; cancellation and unknown
/// chains keep their own meaning.
fn fee_failure(chain_id: u64, err: GatewayError) -> GatewayError {
    match err {
        GatewayError::ChainUnreachable {
            reason, operation, ..
        } => GatewayError::EstimateFeeFailed {
            chain_id,
            reason: format!("{operation}: {reason}"),
        },
        other => other,
    }
}
