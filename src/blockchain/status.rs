// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Status Tracker
//!
//! Answers "where is my delegation transaction?" with one lookup per call:
//!
//! 1. The node does not know the hash → `ChainUnreachable` (retry later).
//! 2. The transaction is not mined yet → `Pending`.
//! 3. Mined, but no receipt served yet, or the receipt is shallower than the
//!    chain's required confirmations → `Pending`.
//! 4. Receipt status 1 → `Success`, status 0 → `Failed`.
//!
//! Nothing is cached and nothing polls; the caller decides the cadence.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::TxHash;

use super::registry::{CallContext, ChainRegistry};
use super::types::{ReceiptSummary, TxStatus};
use crate::error::GatewayError;

#[derive(Clone)]
pub struct StatusTracker {
    registry: Arc<ChainRegistry>,
}

impl StatusTracker {
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self { registry }
    }

    /// Current status of `tx_hash` on `chain_id`.
    pub async fn status(
        &self,
        ctx: &CallContext,
        chain_id: u64,
        tx_hash: &str,
    ) -> Result<TxStatus, GatewayError> {
        let descriptor = self.registry.descriptor(chain_id)?;
        let hash = TxHash::from_str(tx_hash)
            .map_err(|e| GatewayError::InvalidTxHash(format!("{tx_hash}: {e}")))?;

        let lookup = self
            .registry
            .transaction_by_hash(ctx, chain_id, hash)
            .await?
            .ok_or_else(|| GatewayError::ChainUnreachable {
                chain_id,
                operation: "transaction_by_hash",
                reason: format!("transaction {hash} unknown to node"),
            })?;

        if lookup.is_pending() {
            return Ok(TxStatus::Pending);
        }

        let Some(receipt) = self.registry.transaction_receipt(ctx, chain_id, hash).await? else {
            tracing::debug!(chain_id, %hash, "Mined transaction has no receipt yet");
            return Ok(TxStatus::Pending);
        };

        if descriptor.confirmations > 1 {
            let head = self.registry.block_number(ctx, chain_id).await?;
            if !is_confirmed(&receipt, head, descriptor.confirmations) {
                return Ok(TxStatus::Pending);
            }
        }

        let status = if receipt.success {
            TxStatus::Success
        } else {
            TxStatus::Failed
        };

        tracing::info!(chain_id, %hash, status = ?status, "Transaction settled");
        Ok(status)
    }
}

/// A receipt in block `b` has `head - b + 1` confirmations.
fn is_confirmed(receipt: &ReceiptSummary, head: u64, required: u64) -> bool {
    match receipt.block_number {
        Some(block) => head.saturating_sub(block).saturating_add(1) >= required,
        None => false,
    }
}
