// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Split Delegation Gateway
//!
//! Prepares unsigned `setDelegation` transactions that split a token holder's
//! voting power across several delegates, and reports on their progress
//! across the supported EVM chains.
//!
//! ## Modules
//!
//! - `blockchain` - Chain registry, RPC clients, fee quotes, status tracking
//! - `delegation` - Percent to ratio allocation and contract call encoding
//! - `config` - TOML chain configuration
//! - `telemetry` - Tracing subscriber setup

pub mod blockchain;
pub mod config;
pub mod delegation;
pub mod error;
pub mod models;
pub mod state;
pub mod telemetry;
