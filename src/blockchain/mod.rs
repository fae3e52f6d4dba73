// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for EVM chains.
//!
//! This module provides functionality for:
//! - Holding one descriptor and one RPC connection per supported chain
//! - Querying balances and the fee market
//! - Tracking the confirmation state of submitted transactions

pub mod client;
pub mod gas;
pub mod registry;
pub mod rpc;
pub mod status;
pub mod types;

pub use client::EvmClient;
pub use gas::{FeeQuote, GasEstimator};
pub use registry::{CallContext, ChainRegistry};
pub use rpc::{ChainRpc, ChainRpcError};
pub use status::StatusTracker;
pub use types::*;
